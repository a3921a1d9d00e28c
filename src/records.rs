//! Typed records parsed out of single `;`-delimited lines

use std::{io::Read, str::FromStr};

use csv::{ByteRecord, StringRecord, Trim};
use rust_decimal::Decimal;

use crate::{
    errors::LineError,
    types::{Product, ProductId, Salesperson, SalespersonKey},
};

/// Field separator used by every input and output file
pub const DELIMITER: u8 = b';';

/// A record that can be built from the fields of one line.
///
/// Fields beyond [`FromFields::MIN_FIELDS`] are ignored.
pub trait FromFields: Sized {
    /// Lines with fewer fields than this are discarded
    const MIN_FIELDS: usize;

    /// Builds the record. Callers guarantee at least [`FromFields::MIN_FIELDS`] fields.
    fn from_fields(fields: &StringRecord) -> Result<Self, LineError>;
}

/// First line of a transaction file, naming the salesperson who made the sales
#[derive(Debug, PartialEq)]
pub struct SaleHeader(pub SalespersonKey);

/// A single `productId;quantity` line of a transaction file
#[derive(Debug, PartialEq)]
pub struct SaleLine {
    /// The product sold
    pub product_id: ProductId,
    /// Units sold
    pub quantity: i64,
}

/// Parses a record after checking it has enough fields
pub fn parse_record<T: FromFields>(fields: &StringRecord) -> Result<T, LineError> {
    if fields.len() < T::MIN_FIELDS {
        return Err(LineError::TooFewFields {
            expected: T::MIN_FIELDS,
            found: fields.len(),
        });
    }
    T::from_fields(fields)
}

/// Builds a reader for headerless `;`-delimited text.
///
/// Quotes carry no meaning and lines may have any number of fields; field counts are
/// checked per record. Blank lines are skipped.
pub(crate) fn delimited_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader)
}

/// Decodes a raw record, replacing invalid UTF-8 with U+FFFD
pub(crate) fn decode(record: &ByteRecord) -> StringRecord {
    record.iter().map(String::from_utf8_lossy).collect()
}

/// Parses one raw line, as read from a file, into a record.
///
/// A blank line has no fields.
pub fn parse_line<T: FromFields>(line: &[u8]) -> Result<T, LineError> {
    let mut record = ByteRecord::new();
    // reading from a slice cannot fail
    let fields = match delimited_reader(line).read_byte_record(&mut record) {
        Ok(true) => decode(&record),
        _ => StringRecord::new(),
    };
    parse_record(&fields)
}

/// Parses a decimal number, accepting `,` as the decimal separator
pub fn parse_decimal(field: &str) -> Result<Decimal, LineError> {
    Ok(Decimal::from_str(&field.trim().replace(',', "."))?)
}

/// Parses an integer quantity
pub fn parse_quantity(field: &str) -> Result<i64, LineError> {
    Ok(field.trim().parse()?)
}

fn field(fields: &StringRecord, i: usize) -> &str {
    fields.get(i).unwrap_or_default()
}

impl FromFields for SaleHeader {
    const MIN_FIELDS: usize = 2;

    fn from_fields(fields: &StringRecord) -> Result<Self, LineError> {
        Ok(SaleHeader(SalespersonKey::new(
            field(fields, 0),
            field(fields, 1),
        )))
    }
}

impl FromFields for SaleLine {
    const MIN_FIELDS: usize = 2;

    fn from_fields(fields: &StringRecord) -> Result<Self, LineError> {
        Ok(SaleLine {
            product_id: field(fields, 0).into(),
            quantity: parse_quantity(field(fields, 1))?,
        })
    }
}

/// `docType;docNumber;firstName;lastName`
impl FromFields for Salesperson {
    const MIN_FIELDS: usize = 4;

    fn from_fields(fields: &StringRecord) -> Result<Self, LineError> {
        Ok(Salesperson::new(
            SalespersonKey::new(field(fields, 0), field(fields, 1)),
            field(fields, 2),
            field(fields, 3),
        ))
    }
}

/// `productId;name;price`
impl FromFields for Product {
    const MIN_FIELDS: usize = 3;

    fn from_fields(fields: &StringRecord) -> Result<Self, LineError> {
        Ok(Product::new(
            field(fields, 0).into(),
            field(fields, 1),
            parse_decimal(field(fields, 2))?,
        ))
    }
}
