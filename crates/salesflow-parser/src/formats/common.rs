use std::borrow::Cow;
use std::collections::HashMap;

use csv::{ByteRecord, ReaderBuilder};

use crate::coerce::{coerce_date, coerce_number, coerce_text, normalize_sku};
use crate::errors::ParserError;
use crate::model::{NormalizedSale, SaleSource};

/// Where a report takes its `country` value from.
#[derive(Debug, Clone, Copy)]
pub(crate) enum CountryField {
    Column(&'static str),
    Fixed(&'static str),
}

/// Source header for each canonical field, matched after trimming.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColumnMapping {
    pub order_date: &'static str,
    pub sku: &'static str,
    pub quantity: &'static str,
    pub revenue: &'static str,
    pub country: CountryField,
}

struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    fn from_record(parser: &'static str, header: &ByteRecord) -> Result<Self, ParserError> {
        let mut positions = HashMap::new();
        for (idx, raw) in header.iter().enumerate() {
            let name = String::from_utf8_lossy(raw).trim().to_string();
            if !name.is_empty() {
                positions.entry(name).or_insert(idx);
            }
        }
        if positions.is_empty() {
            return Err(ParserError::EmptyHeader { parser });
        }
        Ok(Self { positions })
    }

    fn require(&self, parser: &'static str, column: &'static str) -> Result<usize, ParserError> {
        self.positions
            .get(column)
            .copied()
            .ok_or(ParserError::MissingColumn { parser, column })
    }
}

#[derive(Clone, Copy)]
enum CountryCell {
    Column(usize),
    Fixed(&'static str),
}

struct ResolvedColumns {
    order_date: usize,
    sku: usize,
    quantity: usize,
    revenue: usize,
    country: CountryCell,
}

impl ResolvedColumns {
    fn resolve(
        parser: &'static str,
        header: &HeaderIndex,
        mapping: &ColumnMapping,
    ) -> Result<Self, ParserError> {
        Ok(Self {
            order_date: header.require(parser, mapping.order_date)?,
            sku: header.require(parser, mapping.sku)?,
            quantity: header.require(parser, mapping.quantity)?,
            revenue: header.require(parser, mapping.revenue)?,
            country: match mapping.country {
                CountryField::Column(name) => CountryCell::Column(header.require(parser, name)?),
                CountryField::Fixed(value) => CountryCell::Fixed(value),
            },
        })
    }
}

fn cell(record: &ByteRecord, idx: usize) -> Cow<'_, str> {
    record
        .get(idx)
        .map(String::from_utf8_lossy)
        .unwrap_or(Cow::Borrowed(""))
}

/// Reads a report export and projects every data row onto the canonical schema.
pub(crate) fn normalize_report(
    parser: &'static str,
    source: SaleSource,
    mapping: &ColumnMapping,
    content: &[u8],
) -> Result<Vec<NormalizedSale>, ParserError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content);

    let header = reader
        .byte_headers()
        .map_err(|err| ParserError::Csv { parser, source: err })?;
    let header = HeaderIndex::from_record(parser, header)?;
    let columns = ResolvedColumns::resolve(parser, &header, mapping)?;

    let mut records = Vec::new();
    for row in reader.byte_records() {
        let row = row.map_err(|err| ParserError::Csv { parser, source: err })?;
        let country = match columns.country {
            CountryCell::Column(idx) => coerce_text(&cell(&row, idx)),
            CountryCell::Fixed(value) => Some(value.to_string()),
        };
        records.push(NormalizedSale {
            order_date: coerce_date(&cell(&row, columns.order_date)),
            sku: normalize_sku(&cell(&row, columns.sku)),
            quantity: coerce_number(&cell(&row, columns.quantity)),
            revenue: coerce_number(&cell(&row, columns.revenue)),
            country,
            source,
        });
    }

    Ok(records)
}
