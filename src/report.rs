use std::{fmt::Display, path::PathBuf};

use crate::{money::Money, order::Order, record::OrderId};

/// Summarises one order spreadsheet that was written.
#[derive(Debug)]
pub struct OrderSummary {
    pub id: OrderId,
    pub path: PathBuf,
    pub items: usize,
    pub total: Money,
}

/// Holds the results of a run.
///
/// To create a new, empty `Report`, use [`Report::new`].
///
/// To record an order as written, use [`Report::add_order`].
///
/// To get a printable version of the report, use its [`Display`] implementation.
#[derive(Debug, Default)]
pub struct Report {
    pub dir: PathBuf,
    orders: Vec<OrderSummary>,
    items: usize,
    revenue: Money,
}

impl Report {
    /// Creates a new, empty report for orders written to `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Report {
        Report {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// Records that `order` was written to `path`.
    pub fn add_order(&mut self, order: &Order, path: PathBuf) {
        let total = order.grand_total();
        self.items += order.items.len();
        self.revenue += total;
        self.orders.push(OrderSummary {
            id: order.id.clone(),
            path,
            items: order.items.len(),
            total,
        });
    }

    /// Returns the orders written, in the order they were written.
    #[must_use]
    pub fn orders(&self) -> &[OrderSummary] {
        &self.orders
    }

    /// Returns the total number of line items across every order.
    #[must_use]
    pub fn items(&self) -> usize {
        self.items
    }

    /// Returns the sum of every order's grand total.
    #[must_use]
    pub fn revenue(&self) -> Money {
        self.revenue
    }
}

impl Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let width = self
            .orders
            .iter()
            .map(|o| o.id.as_str().chars().count())
            .chain(["Order".len(), "Total".len()])
            .max()
            .unwrap_or_default();
        writeln!(f, "{:width$} {:>6} {:>14}", "Order", "Items", "Total")?;
        let length = width + 22;
        writeln!(f, "{:-<length$}", "")?;
        for order in &self.orders {
            writeln!(f, "{:width$} {:6} {:>14}", order.id, order.items, order.total)?;
        }
        writeln!(f, "{:-<length$}", "")?;
        writeln!(f, "{:width$} {:6} {:>14}", "Total", self.items, self.revenue)?;
        writeln!(f, "Wrote {} orders to {}", self.orders.len(), self.dir.display())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::record::LineItem;

    fn order(id: &str, totals: &[f64]) -> Order {
        Order {
            id: OrderId::from_str(id).unwrap(),
            items: totals
                .iter()
                .zip(1..)
                .map(|(&total, item_number)| LineItem {
                    item_number,
                    product_code: "S10_1678".into(),
                    product_line: "Motorcycles".into(),
                    qty: 1.0,
                    price: Money::new(total),
                    total: Money::new(total),
                })
                .collect(),
        }
    }

    #[test]
    fn add_order_fn_accumulates_items_and_revenue() {
        let mut report = Report::new("Orders_2026-10-18");
        report.add_order(&order("100", &[5.0, 30.0]), "Order_100.xlsx".into());
        report.add_order(&order("200", &[15.0]), "Order_200.xlsx".into());
        assert_eq!(report.items(), 3);
        assert_eq!(report.revenue(), Money::new(50.0));
        assert_eq!(report.orders().len(), 2);
        assert_eq!(report.orders()[0].total, Money::new(35.0));
    }

    #[test]
    fn display_fn_formats_report_table() {
        let mut report = Report::new("Orders_2026-10-18");
        report.add_order(&order("100", &[5.0, 30.0]), "Order_100.xlsx".into());
        report.add_order(&order("200", &[1234.5]), "Order_200.xlsx".into());
        let want = "\
Order  Items          Total
---------------------------
100        2         $35.00
200        1      $1,234.50
---------------------------
Total      3      $1,269.50
Wrote 2 orders to Orders_2026-10-18
";
        assert_eq!(report.to_string(), want);
    }

    #[test]
    fn display_fn_aligns_non_ascii_ids() {
        let mut report = Report::new("Orders_2026-10-18");
        report.add_order(&order("Ünïcødé", &[5.0]), "a.xlsx".into());
        report.add_order(&order("1", &[5.0]), "b.xlsx".into());
        let text = report.to_string();
        let widths: Vec<_> = text.lines().take(6).map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|&w| w == widths[0]), "{text}");
    }

    #[test]
    fn display_fn_handles_empty_report() {
        let report = Report::new("Orders_2026-10-18");
        assert!(report.to_string().contains("Wrote 0 orders"));
    }
}
