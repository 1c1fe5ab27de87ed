use anyhow::{bail, Context};
use serde::Deserialize;
use serde_with::DeserializeFromStr;
use tracing::{debug, trace};

use std::{
    cmp::Ordering,
    fmt::Display,
    path::Path,
    str::FromStr,
};

use crate::{
    error::{Error, Result},
    money::Money,
};

pub const ORDER_ID: &str = "ORDER ID";
pub const ITEM_NUMBER: &str = "ITEM NUMBER";
pub const PRODUCT_CODE: &str = "PRODUCT CODE";
pub const PRODUCT_LINE: &str = "PRODUCT LINE";
pub const ITEM_QUANTITY: &str = "ITEM QUANTITY";
pub const ITEM_PRICE: &str = "ITEM PRICE";

/// The CSV columns a sales export must have. Any others are ignored.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    ORDER_ID,
    ITEM_NUMBER,
    PRODUCT_CODE,
    PRODUCT_LINE,
    ITEM_QUANTITY,
    ITEM_PRICE,
];

/// Identifies an order.
///
/// Order IDs sort naturally: IDs made only of digits compare as numbers and
/// come before any other IDs, which compare as text.
#[derive(Clone, Debug, DeserializeFromStr, PartialEq, Eq, Hash)]
pub struct OrderId(String);

impl OrderId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn numeric(&self) -> Option<u128> {
        if self.0.bytes().all(|b| b.is_ascii_digit()) {
            self.0.parse().ok()
        } else {
            None
        }
    }
}

impl FromStr for OrderId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            bail!("missing order ID");
        }
        Ok(Self(s.to_string()))
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(&self.0)
    }
}

impl Ord for OrderId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for OrderId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A number of units ordered.
///
/// Whole or fractional, but always a finite number: `NaN` and `inf` are
/// rejected.
#[derive(Clone, Copy, Debug, DeserializeFromStr, PartialEq, PartialOrd)]
pub struct Quantity(f64);

impl Quantity {
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl FromStr for Quantity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            bail!("missing quantity");
        }
        let value: f64 = s.parse().with_context(|| format!("{s:?} is not a number"))?;
        if !value.is_finite() {
            bail!("{s:?} is not a finite number");
        }
        Ok(Self(value))
    }
}

/// Defines the CSV format for sales data.
#[derive(Debug, Deserialize)]
pub struct Record {
    #[serde(rename = "ORDER ID")]
    pub order_id: OrderId,
    #[serde(rename = "ITEM NUMBER")]
    pub item_number: u32,
    #[serde(rename = "PRODUCT CODE")]
    pub product_code: String,
    #[serde(rename = "PRODUCT LINE")]
    pub product_line: String,
    #[serde(rename = "ITEM QUANTITY")]
    pub qty: Quantity,
    #[serde(rename = "ITEM PRICE")]
    pub price: Money,
}

/// One line of an order, with its total price worked out.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem {
    pub item_number: u32,
    pub product_code: String,
    pub product_line: String,
    pub qty: f64,
    pub price: Money,
    pub total: Money,
}

impl Record {
    /// Splits the record into its order ID and a priced line item.
    #[must_use]
    pub fn into_line_item(self) -> (OrderId, LineItem) {
        let item = LineItem {
            item_number: self.item_number,
            product_code: self.product_code,
            product_line: self.product_line,
            qty: self.qty.value(),
            price: self.price,
            total: self.price * self.qty.value(),
        };
        (self.order_id, item)
    }
}

/// Reads every sales record from the CSV file at `path`.
///
/// The whole file is read and checked before anything is returned, so a
/// problem on the last line still means no orders get written.
///
/// # Errors
///
/// * [`Error::Parse`] if the file cannot be opened or is not valid CSV
/// * [`Error::Schema`] if one of [`REQUIRED_COLUMNS`] is missing
/// * [`Error::Data`] if a quantity, price or item number is blank or not a
///   number, an order ID is blank, or a total price is too large to represent
pub fn read_csv(path: impl AsRef<Path>) -> Result<Vec<(OrderId, LineItem)>> {
    let path = path.as_ref();
    let parse_err = |source| Error::Parse {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(parse_err)?;
    let headers = rdr.headers().map_err(parse_err)?.clone();
    if let Some(column) = REQUIRED_COLUMNS
        .into_iter()
        .find(|column| !headers.iter().any(|h| h == *column))
    {
        return Err(Error::Schema {
            path: path.to_path_buf(),
            column,
        });
    }
    let mut items = Vec::new();
    for result in rdr.records() {
        let raw = result.map_err(parse_err)?;
        let record: Record = raw
            .deserialize(Some(&headers))
            .map_err(|err| data_error(path, &headers, &raw, err))?;
        trace!(?record, "read record");
        let (id, item) = record.into_line_item();
        if !item.total.dollars().is_finite() {
            return Err(Error::Data {
                path: path.to_path_buf(),
                line: raw.position().map_or(0, csv::Position::line),
                column: Some(ITEM_QUANTITY.to_string()),
                message: "total price is too large".to_string(),
            });
        }
        items.push((id, item));
    }
    debug!("read {} line items from {}", items.len(), path.display());
    Ok(items)
}

fn data_error(
    path: &Path,
    headers: &csv::StringRecord,
    raw: &csv::StringRecord,
    err: csv::Error,
) -> Error {
    if let csv::ErrorKind::Deserialize { pos, err: de } = err.kind() {
        // csv only knows the field index for its own parse errors, not for
        // errors raised by our FromStr types
        let column = de
            .field()
            .and_then(|i| headers.get(usize::try_from(i).ok()?))
            .or_else(|| failing_column(headers, raw))
            .map(str::to_string);
        let message = match &column {
            Some(column) => format!("column {column:?}: {}", de.kind()),
            None => de.kind().to_string(),
        };
        return Error::Data {
            path: path.to_path_buf(),
            line: pos
                .as_ref()
                .or(raw.position())
                .map_or(0, csv::Position::line),
            column,
            message,
        };
    }
    Error::Parse {
        path: path.to_path_buf(),
        source: err,
    }
}

/// Finds the first column of `raw` whose value our own parsers reject.
fn failing_column(
    headers: &csv::StringRecord,
    raw: &csv::StringRecord,
) -> Option<&'static str> {
    let field = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|i| raw.get(i))
            .unwrap_or_default()
    };
    if OrderId::from_str(field(ORDER_ID)).is_err() {
        Some(ORDER_ID)
    } else if Quantity::from_str(field(ITEM_QUANTITY)).is_err() {
        Some(ITEM_QUANTITY)
    } else if Money::from_str(field(ITEM_PRICE)).is_err() {
        Some(ITEM_PRICE)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> OrderId {
        OrderId::from_str(s).unwrap()
    }

    #[test]
    fn order_id_ord_sorts_numbers_numerically_before_text() {
        let mut ids = vec![id("B7"), id("200"), id("A1"), id("99"), id("1000")];
        ids.sort();
        let ids: Vec<_> = ids.iter().map(OrderId::as_str).collect();
        assert_eq!(ids, vec!["99", "200", "1000", "A1", "B7"]);
    }

    #[test]
    fn order_id_ord_is_total_for_equal_numbers() {
        assert_eq!(id("007").cmp(&id("7")), Ordering::Less);
        assert_eq!(id("7").cmp(&id("7")), Ordering::Equal);
    }

    #[test]
    fn order_id_from_str_rejects_blank_ids() {
        assert!(OrderId::from_str("  ").is_err());
        assert_eq!(id(" 100 ").as_str(), "100");
    }

    #[test]
    fn into_line_item_fn_computes_total_price() {
        let record = Record {
            order_id: id("100"),
            item_number: 2,
            product_code: "S10_1678".into(),
            product_line: "Motorcycles".into(),
            qty: Quantity(3.0),
            price: Money::new(10.0),
        };
        let (order_id, item) = record.into_line_item();
        assert_eq!(order_id, id("100"));
        assert_eq!(item.total, Money::new(30.0));
    }

    #[test]
    fn read_csv_fn_correctly_parses_sales_data() {
        let items = read_csv("testdata/sales.csv").unwrap();
        assert_eq!(items.len(), 3);
        let (order_id, first) = &items[0];
        assert_eq!(order_id.as_str(), "100");
        assert_eq!(first.item_number, 2);
        assert_eq!(first.product_code, "S10_1678");
        assert_eq!(first.product_line, "Motorcycles");
        assert_eq!(first.total, Money::new(30.0));
        assert_eq!(items[2].1.total, Money::new(15.0));
    }

    #[test]
    fn read_csv_fn_ignores_extra_columns_in_any_order() {
        let items = read_csv("testdata/extra_columns.csv").unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].0.as_str(), "10107");
        assert_eq!(items[0].1.price, Money::new(1234.5));
        assert_eq!(items[0].1.total, Money::new(2469.0));
    }

    #[test]
    fn read_csv_fn_returns_schema_error_for_missing_column() {
        let err = read_csv("testdata/missing_price.csv").unwrap_err();
        assert!(
            matches!(err, Error::Schema { column: ITEM_PRICE, .. }),
            "{err:?}"
        );
    }

    #[test]
    fn read_csv_fn_returns_data_error_for_non_numeric_quantity() {
        let err = read_csv("testdata/bad_quantity.csv").unwrap_err();
        match err {
            Error::Data { line, column, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column.as_deref(), Some(ITEM_QUANTITY));
            }
            other => panic!("expected data error, got {other:?}"),
        }
    }

    #[test]
    fn read_csv_fn_returns_data_error_for_blank_price() {
        let err = read_csv("testdata/blank_price.csv").unwrap_err();
        match err {
            Error::Data { line, column, .. } => {
                assert_eq!(line, 2);
                assert_eq!(column.as_deref(), Some(ITEM_PRICE));
            }
            other => panic!("expected data error, got {other:?}"),
        }
    }

    #[test]
    fn quantity_from_str_rejects_blank_and_non_finite_values() {
        assert_eq!(Quantity::from_str("3").unwrap().value(), 3.0);
        assert_eq!(Quantity::from_str(" 2.5 ").unwrap().value(), 2.5);
        for bad in ["", "lots", "NaN", "nan", "inf", "-inf", "infinity"] {
            assert!(Quantity::from_str(bad).is_err(), "{bad:?} accepted");
        }
    }

    #[test]
    fn read_csv_fn_returns_data_error_for_non_finite_quantities() {
        for fixture in ["testdata/nan_quantity.csv", "testdata/inf_quantity.csv"] {
            let err = read_csv(fixture).unwrap_err();
            match err {
                Error::Data { line, column, .. } => {
                    assert_eq!(line, 2, "{fixture}");
                    assert_eq!(column.as_deref(), Some(ITEM_QUANTITY), "{fixture}");
                }
                other => panic!("{fixture}: expected data error, got {other:?}"),
            }
        }
    }

    #[test]
    fn read_csv_fn_returns_data_error_for_overflowing_total() {
        let err = read_csv("testdata/huge_total.csv").unwrap_err();
        assert!(matches!(err, Error::Data { line: 2, .. }), "{err:?}");
    }

    #[test]
    fn read_csv_fn_returns_data_error_for_fractional_item_number() {
        let err = read_csv("testdata/fractional_item_number.csv").unwrap_err();
        match err {
            Error::Data { line, column, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column.as_deref(), Some(ITEM_NUMBER));
            }
            other => panic!("expected data error, got {other:?}"),
        }
    }

    #[test]
    fn read_csv_fn_returns_data_error_for_blank_order_id() {
        let err = read_csv("testdata/blank_order_id.csv").unwrap_err();
        match err {
            Error::Data { line, column, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column.as_deref(), Some(ORDER_ID));
            }
            other => panic!("expected data error, got {other:?}"),
        }
    }

    #[test]
    fn read_csv_fn_returns_parse_error_for_invalid_utf8() {
        let err = read_csv("testdata/bad_utf8.csv").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "{err:?}");
    }

    #[test]
    fn read_csv_fn_returns_parse_error_for_ragged_rows() {
        let err = read_csv("testdata/ragged.csv").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "{err:?}");
    }

    #[test]
    fn read_csv_fn_returns_parse_error_for_missing_file() {
        let err = read_csv("testdata/bogus.csv").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "{err:?}");
    }
}
