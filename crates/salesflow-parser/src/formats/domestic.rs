use crate::errors::ParserError;
use crate::model::{SaleSource, SourceFrame};
use crate::registry::SalesReportParser;

use super::common::{normalize_report, ColumnMapping, CountryField};

/// Marketplace order export: one row per order line, shipped country included.
pub struct DomesticReportParser;

impl Default for DomesticReportParser {
    fn default() -> Self {
        Self
    }
}

impl DomesticReportParser {
    const NAME: &'static str = "DOMESTIC_REPORT";

    const MAPPING: ColumnMapping = ColumnMapping {
        order_date: "Date",
        sku: "SKU",
        quantity: "Qty",
        revenue: "Amount",
        country: CountryField::Column("ship-country"),
    };
}

impl SalesReportParser for DomesticReportParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn source(&self) -> SaleSource {
        SaleSource::Domestic
    }

    fn parse(&self, content: &[u8]) -> Result<SourceFrame, ParserError> {
        let records = normalize_report(Self::NAME, self.source(), &Self::MAPPING, content)?;
        Ok(SourceFrame {
            source: self.source(),
            records,
        })
    }
}
