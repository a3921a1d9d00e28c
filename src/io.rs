//! Helpers for reading reference files and folding transaction files into them

use std::{
    fs::File,
    io::{BufRead, BufReader, Read},
    path::Path,
};

use csv::ByteRecord;
use log::{debug, warn};

use crate::{
    errors::{Error, LineError},
    ops::{self, SaleOutcome},
    records::{self, delimited_reader, FromFields, SaleHeader, SaleLine},
    types::{Catalog, Keyed, ReferenceTable, Salespeople},
};

fn open(path: &Path) -> Result<File, Error> {
    File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Physical line of a record, for a reader that started `skipped` lines into the file
fn line_number(record: &ByteRecord, skipped: u64) -> u64 {
    record.position().map_or(0, csv::Position::line) + skipped
}

/// Reads every parseable line into a table, skipping lines that fail to parse
fn load_table<R, V>(reader: R) -> Result<ReferenceTable<V>, Error>
where
    R: Read,
    V: Keyed + FromFields,
{
    let mut table = ReferenceTable::new();
    for record in delimited_reader(reader).byte_records() {
        let record = record?;
        let line = line_number(&record, 0);
        match records::parse_record::<V>(&records::decode(&record)) {
            Ok(entry) => {
                if let Some(replaced) = table.insert(entry) {
                    debug!("line {line}: replaces earlier entry for {:?}", replaced.key());
                }
            }
            Err(err) if err.is_noise() => debug!("line {line}: skipped, {err}"),
            Err(err) => warn!("line {line}: skipped, {err}"),
        }
    }
    Ok(table)
}

/// Loads salespeople from a stream.
///
/// Expects one salesperson per line, without a header:
/// ```text
/// CC;1001;Ana;Ruiz
/// CC;1002;Luis;Gomez
/// ```
/// Lines with fewer than four fields are skipped. A repeated document pair replaces the
/// earlier salesperson.
pub fn load_salespeople_from_reader<R: Read>(reader: R) -> Result<Salespeople, Error> {
    load_table(reader)
}

/// Loads salespeople from a file. See [`load_salespeople_from_reader`].
///
/// # Errors
/// [`Error::Open`] if the file is missing or unreadable
pub fn load_salespeople<P: AsRef<Path>>(path: P) -> Result<Salespeople, Error> {
    load_salespeople_from_reader(open(path.as_ref())?)
}

/// Loads products from a stream.
///
/// Expects one product per line, without a header. Prices may use either decimal separator:
/// ```text
/// P1;Widget;10.00
/// P2;Gadget;20,50
/// ```
/// Lines with fewer than three fields, or with a price that isn't a number, are skipped.
/// A repeated product ID replaces the earlier product.
pub fn load_products_from_reader<R: Read>(reader: R) -> Result<Catalog, Error> {
    load_table(reader)
}

/// Loads products from a file. See [`load_products_from_reader`].
///
/// # Errors
/// [`Error::Open`] if the file is missing or unreadable
pub fn load_products<P: AsRef<Path>>(path: P) -> Result<Catalog, Error> {
    load_products_from_reader(open(path.as_ref())?)
}

/// Why a transaction file contributed nothing
#[derive(Debug, PartialEq)]
pub enum SkipReason {
    /// The file has no lines at all
    Empty,
    /// The first line doesn't name a salesperson
    MalformedHeader(LineError),
}

/// Counts of what happened to the lines of one transaction file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileSummary {
    /// Whether the header named a known salesperson
    pub salesperson_found: bool,
    /// Sale lines credited to a known product
    pub sales_applied: usize,
    /// Sale lines naming a product that isn't in the catalog
    pub unknown_products: usize,
    /// Sale lines that couldn't be parsed
    pub malformed_lines: usize,
    /// Sale lines dropped because a running total would overflow
    pub overflowed_lines: usize,
}

/// The result of folding one transaction file into the reference tables
#[derive(Debug, PartialEq)]
pub enum FileOutcome {
    /// The file's sale lines were applied
    Aggregated(FileSummary),
    /// The file was skipped as a whole
    Skipped(SkipReason),
}

/// Folds one transaction file's sales into the reference tables.
///
/// Expects a header naming the salesperson, then one sale per line:
/// ```text
/// CC;1001
/// P1;2
/// P2;1
/// ```
/// Each sale adds its quantity to the product's units sold and, when the header's salesperson
/// is known, `quantity × price` to their total. Unknown products and malformed lines are
/// logged and skipped without affecting the rest of the file, as are sales too large to add
/// to a running total.
///
/// The first line is always the header, even when blank. Invalid UTF-8 is replaced rather
/// than rejected.
///
/// # Errors
/// [`Error::Read`] or [`Error::Csv`] if the stream can't be read. Lines already applied stay
/// applied.
pub fn aggregate_sales<R: Read>(
    reader: R,
    salespeople: &mut Salespeople,
    catalog: &mut Catalog,
) -> Result<FileOutcome, Error> {
    let mut reader = BufReader::new(reader);
    let mut header = Vec::new();
    if reader.read_until(b'\n', &mut header)? == 0 {
        return Ok(FileOutcome::Skipped(SkipReason::Empty));
    }
    let SaleHeader(key) = match records::parse_line::<SaleHeader>(&header) {
        Ok(header) => header,
        Err(err) => return Ok(FileOutcome::Skipped(SkipReason::MalformedHeader(err))),
    };
    let mut summary = FileSummary {
        salesperson_found: salespeople.get(&key).is_some(),
        ..FileSummary::default()
    };
    if !summary.salesperson_found {
        warn!("unknown salesperson {key}; only product counts will be updated");
    }

    for record in delimited_reader(reader).byte_records() {
        let record = record?;
        let line = line_number(&record, 1);
        let sale: SaleLine = match records::parse_record(&records::decode(&record)) {
            Ok(sale) => sale,
            Err(err) => {
                if err.is_noise() {
                    debug!("line {line}: skipped, {err}");
                } else {
                    warn!("line {line}: skipped, {err}");
                }
                summary.malformed_lines += 1;
                continue;
            }
        };
        match ops::apply_sale(catalog, salespeople, Some(&key), &sale) {
            SaleOutcome::Credited | SaleOutcome::ProductOnly => summary.sales_applied += 1,
            SaleOutcome::UnknownProduct => {
                debug!("line {line}: unknown product {}", sale.product_id);
                summary.unknown_products += 1;
            }
            SaleOutcome::Overflow => {
                warn!("line {line}: skipped, total for {} would overflow", sale.product_id);
                summary.overflowed_lines += 1;
            }
        }
    }
    Ok(FileOutcome::Aggregated(summary))
}

/// Folds one transaction file into the reference tables. See [`aggregate_sales`].
///
/// # Errors
/// [`Error::Open`] if the file can't be opened, or [`Error::Read`]/[`Error::Csv`] if reading
/// fails part way
pub fn aggregate_sales_file<P: AsRef<Path>>(
    path: P,
    salespeople: &mut Salespeople,
    catalog: &mut Catalog,
) -> Result<FileOutcome, Error> {
    aggregate_sales(open(path.as_ref())?, salespeople, catalog)
}
