#![doc = include_str!("../README.md")]
use chrono::NaiveDate;
use tracing::debug;

use std::path::Path;

pub mod error;
pub mod money;
pub mod order;
pub mod orders_dir;
pub mod record;
pub mod report;
pub mod sheet;
pub mod source;

pub use error::{Error, Result};
pub use money::Money;
pub use order::{group_orders, Order};
pub use orders_dir::{create_orders_dir, orders_dir_path};
pub use record::{read_csv, LineItem, OrderId};
pub use report::Report;
pub use sheet::write_order;
pub use source::resolve_source;

/// Splits the sales data at `source` into one spreadsheet per order, written
/// into `dir`.
///
/// Every row is read and checked before the first spreadsheet is written, so
/// bad input never produces a partial set of orders.
///
/// # Errors
///
/// Returns any error from [`read_csv`] or [`write_order`]. If writing fails
/// part way through, spreadsheets already written stay on disk.
pub fn split_orders(source: impl AsRef<Path>, dir: impl AsRef<Path>) -> Result<Report> {
    let orders = group_orders(read_csv(source)?);
    let mut report = Report::new(dir.as_ref());
    for order in &orders {
        debug!("order {}: {} line items", order.id, order.items.len());
        let path = write_order(order, dir.as_ref())?;
        report.add_order(order, path);
    }
    Ok(report)
}

/// Runs the whole conversion: checks `source` exists, creates the orders
/// directory for `date` next to it, and writes the order spreadsheets.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if `source` is not a file, and otherwise any
/// error from [`create_orders_dir`] or [`split_orders`].
pub fn run(source: impl AsRef<Path>, date: NaiveDate) -> Result<Report> {
    let source = resolve_source(source.as_ref())?;
    let dir = create_orders_dir(&source, date)?;
    split_orders(&source, &dir)
}
