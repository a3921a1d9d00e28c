//! Ranked reports built from the final state of the reference tables

use std::{fs::File, io::Write, path::Path};

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::{
    errors::Error,
    records::DELIMITER,
    types::{Catalog, Product, Salespeople, Salesperson},
};

/// Formats an amount in plain decimal notation with at least one fractional digit.
///
/// Trailing zeros are dropped, so `40.00` becomes `40.0` and `12.50` becomes `12.5`.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    let amount = amount.normalize();
    if amount.scale() == 0 {
        format!("{amount}.0")
    } else {
        amount.to_string()
    }
}

fn serialize_amount<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_amount(*amount))
}

/// One line of the salesperson report
#[derive(Serialize, Debug, PartialEq)]
pub struct SalespersonRow {
    /// First and last name
    pub full_name: String,
    /// Value of everything the salesperson sold
    #[serde(serialize_with = "serialize_amount")]
    pub total_sales: Decimal,
}

impl From<&Salesperson> for SalespersonRow {
    fn from(salesperson: &Salesperson) -> Self {
        Self {
            full_name: salesperson.full_name(),
            total_sales: salesperson.total_sales(),
        }
    }
}

/// One line of the product report
#[derive(Serialize, Debug, PartialEq)]
pub struct ProductRow {
    /// The product's display name
    pub name: String,
    /// Units sold across all transaction files
    pub units_sold: i64,
    /// Price of one unit
    #[serde(serialize_with = "serialize_amount")]
    pub unit_price: Decimal,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name().to_owned(),
            units_sold: product.units_sold(),
            unit_price: product.price(),
        }
    }
}

/// Ranks salespeople by total sales, highest first.
///
/// Ties keep the order in which salespeople were loaded.
#[must_use]
pub fn salesperson_report(salespeople: &Salespeople) -> Vec<SalespersonRow> {
    let mut rows: Vec<_> = salespeople.iter().map(SalespersonRow::from).collect();
    rows.sort_by(|a, b| b.total_sales.cmp(&a.total_sales));
    rows
}

/// Ranks products by units sold, highest first.
///
/// Ties keep the order in which products were loaded.
#[must_use]
pub fn product_report(catalog: &Catalog) -> Vec<ProductRow> {
    let mut rows: Vec<_> = catalog.iter().map(ProductRow::from).collect();
    rows.sort_by(|a, b| b.units_sold.cmp(&a.units_sold));
    rows
}

fn write_rows<W, T>(writer: W, rows: &[T]) -> Result<(), Error>
where
    W: Write,
    T: Serialize,
{
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn create(path: &Path) -> Result<File, Error> {
    File::create(path).map_err(|source| Error::Create {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the salesperson report.
///
/// Output has no header and one salesperson per line:
/// ```text
/// Ana Ruiz;40.0
/// Luis Gomez;12.5
/// ```
pub fn write_salesperson_report<W: Write>(
    writer: W,
    salespeople: &Salespeople,
) -> Result<(), Error> {
    write_rows(writer, &salesperson_report(salespeople))
}

/// Writes the salesperson report to a file, replacing any existing one.
///
/// # Errors
/// [`Error::Create`] if the file can't be created, or [`Error::Csv`] if writing fails
pub fn write_salesperson_report_to<P: AsRef<Path>>(
    path: P,
    salespeople: &Salespeople,
) -> Result<(), Error> {
    write_salesperson_report(create(path.as_ref())?, salespeople)
}

/// Writes the product report.
///
/// Output has no header and one product per line:
/// ```text
/// Widget;2;10.0
/// Gadget;1;20.0
/// ```
pub fn write_product_report<W: Write>(writer: W, catalog: &Catalog) -> Result<(), Error> {
    write_rows(writer, &product_report(catalog))
}

/// Writes the product report to a file, replacing any existing one.
///
/// # Errors
/// [`Error::Create`] if the file can't be created, or [`Error::Csv`] if writing fails
pub fn write_product_report_to<P: AsRef<Path>>(path: P, catalog: &Catalog) -> Result<(), Error> {
    write_product_report(create(path.as_ref())?, catalog)
}
