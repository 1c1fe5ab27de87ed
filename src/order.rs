use tracing::debug;

use std::collections::BTreeMap;

use crate::{
    money::Money,
    record::{
        LineItem, OrderId, ITEM_NUMBER, ITEM_PRICE, ITEM_QUANTITY, PRODUCT_CODE, PRODUCT_LINE,
    },
};

/// The columns of an order sheet, left to right.
///
/// The order ID is not a column: every row on a sheet belongs to the same
/// order, so the ID goes in the file and sheet names instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
    ItemNumber,
    ProductCode,
    ProductLine,
    ItemQuantity,
    ItemPrice,
    TotalPrice,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::ItemNumber,
        Column::ProductCode,
        Column::ProductLine,
        Column::ItemQuantity,
        Column::ItemPrice,
        Column::TotalPrice,
    ];

    #[must_use]
    pub fn header(self) -> &'static str {
        match self {
            Column::ItemNumber => ITEM_NUMBER,
            Column::ProductCode => PRODUCT_CODE,
            Column::ProductLine => PRODUCT_LINE,
            Column::ItemQuantity => ITEM_QUANTITY,
            Column::ItemPrice => ITEM_PRICE,
            Column::TotalPrice => "TOTAL PRICE",
        }
    }

    /// Reports whether the column holds dollar amounts.
    #[must_use]
    pub fn is_money(self) -> bool {
        matches!(self, Column::ItemPrice | Column::TotalPrice)
    }
}

/// The value in one cell of an order sheet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cell<'a> {
    Blank,
    Text(&'a str),
    Number(f64),
}

/// One row of an order sheet: either a line item, or the grand total that
/// closes the sheet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Row<'a> {
    Item(&'a LineItem),
    GrandTotal(Money),
}

impl<'a> Row<'a> {
    #[must_use]
    pub fn cell(&self, column: Column) -> Cell<'a> {
        match (*self, column) {
            (Row::Item(item), Column::ItemNumber) => Cell::Number(f64::from(item.item_number)),
            (Row::Item(item), Column::ProductCode) => Cell::Text(&item.product_code),
            (Row::Item(item), Column::ProductLine) => Cell::Text(&item.product_line),
            (Row::Item(item), Column::ItemQuantity) => Cell::Number(item.qty),
            (Row::Item(item), Column::ItemPrice) => Cell::Number(item.price.dollars()),
            (Row::Item(item), Column::TotalPrice) => Cell::Number(item.total.dollars()),
            (Row::GrandTotal(total), Column::TotalPrice) => Cell::Number(total.dollars()),
            (Row::GrandTotal(_), _) => Cell::Blank,
        }
    }
}

/// All the line items for one order, sorted by item number.
#[derive(Debug, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub items: Vec<LineItem>,
}

impl Order {
    /// Returns the sum of the total prices of every line item.
    #[must_use]
    pub fn grand_total(&self) -> Money {
        self.items.iter().map(|item| item.total).sum()
    }

    /// Returns the rows to put on the order sheet: each line item in turn,
    /// then the grand total.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.items
            .iter()
            .map(Row::Item)
            .chain(std::iter::once(Row::GrandTotal(self.grand_total())))
    }
}

/// Partitions line items into orders.
///
/// Orders come back in ascending [`OrderId`] order. Within each order, line
/// items are sorted by item number; items with the same number keep the order
/// they had in `items`.
#[must_use]
pub fn group_orders(items: impl IntoIterator<Item = (OrderId, LineItem)>) -> Vec<Order> {
    let mut groups: BTreeMap<OrderId, Vec<LineItem>> = BTreeMap::new();
    for (id, item) in items {
        groups.entry(id).or_default().push(item);
    }
    debug!("grouped line items into {} orders", groups.len());
    groups
        .into_iter()
        .map(|(id, mut items)| {
            items.sort_by_key(|item| item.item_number);
            Order { id, items }
        })
        .collect()
}
