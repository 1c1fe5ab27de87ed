use regex::{Captures, Regex};
use rust_xlsxwriter::{ColNum, Format, FormatAlign, FormatBorder, RowNum, Workbook, XlsxError};
use tracing::{debug, info};

use std::{
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use crate::{
    error::{Error, Result},
    order::{Cell, Column, Order},
    record::OrderId,
};

/// Number format for dollar amounts, e.g. `$1,234.56`.
pub const MONEY_FORMAT: &str = "$#,##0.00";

/// Excel's limit on the length of a worksheet name.
const MAX_SHEET_NAME_LEN: usize = 31;

static FILE_NAME_UNSAFE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[%/\\:*?"<>|\x00-\x1f]"#).expect("valid regex"));
static SHEET_NAME_UNSAFE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\[\]:*?/\\]").expect("valid regex"));

/// Returns the file name of the spreadsheet for order `id`.
///
/// Characters that are not allowed in file names, and `%` itself, are
/// written as `%XX` hex escapes, so different IDs always get different
/// file names.
///
/// # Examples
///
/// ```
/// # use std::str::FromStr;
/// # use orders::{sheet::file_name, OrderId};
/// assert_eq!(file_name(&OrderId::from_str("10100").unwrap()), "Order_10100.xlsx");
/// assert_eq!(file_name(&OrderId::from_str("A/B").unwrap()), "Order_A%2FB.xlsx");
/// ```
#[must_use]
pub fn file_name(id: &OrderId) -> String {
    let id = FILE_NAME_UNSAFE.replace_all(id.as_str(), |caps: &Captures| {
        // every unsafe character is ASCII, so one byte
        format!("%{:02X}", caps[0].as_bytes()[0])
    });
    format!("Order_{id}.xlsx")
}

/// Returns the worksheet name for order `id`, e.g. `Order 10100`.
///
/// Characters Excel does not allow in sheet names are replaced with `_`, and
/// long names are cut to 31 characters. A trailing `'` is also replaced, as
/// Excel rejects names that end with one.
#[must_use]
pub fn sheet_name(id: &OrderId) -> String {
    let name = format!("Order {}", SHEET_NAME_UNSAFE.replace_all(id.as_str(), "_"));
    let mut name: String = name.chars().take(MAX_SHEET_NAME_LEN).collect();
    if name.ends_with('\'') {
        name.pop();
        name.push('_');
    }
    name
}

/// Column width in Excel character units.
fn width(column: Column) -> f64 {
    match column {
        Column::ItemNumber | Column::ItemQuantity | Column::ItemPrice => 12.0,
        Column::ProductCode | Column::TotalPrice => 15.0,
        Column::ProductLine => 25.0,
    }
}

fn col_num(i: usize) -> ColNum {
    ColNum::try_from(i).unwrap_or(ColNum::MAX)
}

/// Builds the workbook for `order`: a header row, one row per line item, and
/// a grand total row, with money columns shown as dollars.
///
/// # Errors
///
/// Returns any error from `rust_xlsxwriter`.
pub fn build_workbook(order: &Order) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center);
    let money = Format::new().set_num_format(MONEY_FORMAT);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(&order.id))?;
    for (i, column) in Column::ALL.into_iter().enumerate() {
        let col = col_num(i);
        worksheet.set_column_width(col, width(column))?;
        if column.is_money() {
            worksheet.set_column_format(col, &money)?;
        }
        worksheet.write_string_with_format(0, col, column.header(), &header)?;
    }

    let mut row: RowNum = 1;
    for sheet_row in order.rows() {
        for (i, column) in Column::ALL.into_iter().enumerate() {
            let col = col_num(i);
            match sheet_row.cell(column) {
                Cell::Blank => {}
                Cell::Text(text) => {
                    worksheet.write_string(row, col, text)?;
                }
                Cell::Number(n) if column.is_money() => {
                    worksheet.write_number_with_format(row, col, n, &money)?;
                }
                Cell::Number(n) => {
                    worksheet.write_number(row, col, n)?;
                }
            }
        }
        row += 1;
    }
    Ok(workbook)
}

/// Writes the spreadsheet for `order` into `dir`, returning its path.
///
/// The workbook is written to a hidden temporary file in `dir` first, then
/// renamed into place, so an existing spreadsheet from an earlier run is
/// either replaced whole or left alone.
///
/// # Errors
///
/// * [`Error::Xlsx`] if the workbook cannot be built or serialised
/// * [`Error::Io`] if the file cannot be written or renamed
pub fn write_order(order: &Order, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let name = file_name(&order.id);
    let path = dir.as_ref().join(&name);
    let xlsx_err = |source| Error::Xlsx {
        path: path.clone(),
        source,
    };
    let bytes = build_workbook(order)
        .and_then(|mut workbook| workbook.save_to_buffer())
        .map_err(xlsx_err)?;

    let temp_path = dir.as_ref().join(format!(".{name}.tmp"));
    debug!("writing {} bytes to {}", bytes.len(), temp_path.display());
    fs::write(&temp_path, &bytes).map_err(|e| Error::io(&temp_path, e))?;
    if let Err(e) = fs::rename(&temp_path, &path) {
        let _ = fs::remove_file(&temp_path);
        return Err(Error::io(&path, e));
    }
    info!(
        "wrote {} ({} items, total {})",
        path.display(),
        order.items.len(),
        order.grand_total()
    );
    Ok(path)
}
