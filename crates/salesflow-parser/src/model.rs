use std::fmt;

use chrono::NaiveDate;
use polars::prelude::*;

/// Column order shared by every normalized table.
pub const CANONICAL_COLUMNS: [&str; 6] = [
    "order_date",
    "sku",
    "quantity",
    "revenue",
    "country",
    "source",
];

/// Explicit textual form of `order_date` in every table written to disk.
pub const ORDER_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SaleSource {
    Domestic,
    International,
}

impl SaleSource {
    pub const ALL: [SaleSource; 2] = [SaleSource::Domestic, SaleSource::International];

    pub fn as_str(&self) -> &'static str {
        match self {
            SaleSource::Domestic => "domestic",
            SaleSource::International => "international",
        }
    }
}

impl fmt::Display for SaleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for SaleSource {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "domestic" => Ok(SaleSource::Domestic),
            "international" => Ok(SaleSource::International),
            other => Err(format!("unknown sale source '{other}'")),
        }
    }
}

/// One row in the canonical schema. Every field except `source` may be absent
/// after coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSale {
    pub order_date: Option<NaiveDate>,
    pub sku: Option<String>,
    pub quantity: Option<f64>,
    pub revenue: Option<f64>,
    pub country: Option<String>,
    pub source: SaleSource,
}

impl NormalizedSale {
    /// Identity used for exact-duplicate removal. Floats compare by bit
    /// pattern after folding `-0.0` into `0.0`.
    pub fn dedup_key(&self) -> SaleKey {
        SaleKey {
            order_date: self.order_date,
            sku: self.sku.clone(),
            quantity: self.quantity.map(float_bits),
            revenue: self.revenue.map(float_bits),
            country: self.country.clone(),
            source: self.source,
        }
    }
}

fn float_bits(value: f64) -> u64 {
    if value == 0.0 {
        0.0f64.to_bits()
    } else {
        value.to_bits()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SaleKey {
    order_date: Option<NaiveDate>,
    sku: Option<String>,
    quantity: Option<u64>,
    revenue: Option<u64>,
    country: Option<String>,
    source: SaleSource,
}

#[derive(Debug, Clone)]
pub struct SourceFrame {
    pub source: SaleSource,
    pub records: Vec<NormalizedSale>,
}

impl SourceFrame {
    pub fn height(&self) -> usize {
        self.records.len()
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        records_to_dataframe(&self.records)
    }
}

/// Builds a frame with exactly [`CANONICAL_COLUMNS`], in order.
pub fn records_to_dataframe(records: &[NormalizedSale]) -> PolarsResult<DataFrame> {
    let order_date: Vec<Option<String>> = records
        .iter()
        .map(|r| r.order_date.map(|d| d.format(ORDER_DATE_FORMAT).to_string()))
        .collect();
    let sku: Vec<Option<&str>> = records.iter().map(|r| r.sku.as_deref()).collect();
    let quantity: Vec<Option<f64>> = records.iter().map(|r| r.quantity).collect();
    let revenue: Vec<Option<f64>> = records.iter().map(|r| r.revenue).collect();
    let country: Vec<Option<&str>> = records.iter().map(|r| r.country.as_deref()).collect();
    let source: Vec<&str> = records.iter().map(|r| r.source.as_str()).collect();

    DataFrame::new(vec![
        Series::new(CANONICAL_COLUMNS[0].into(), order_date).into(),
        Series::new(CANONICAL_COLUMNS[1].into(), sku).into(),
        Series::new(CANONICAL_COLUMNS[2].into(), quantity).into(),
        Series::new(CANONICAL_COLUMNS[3].into(), revenue).into(),
        Series::new(CANONICAL_COLUMNS[4].into(), country).into(),
        Series::new(CANONICAL_COLUMNS[5].into(), source).into(),
    ])
}
