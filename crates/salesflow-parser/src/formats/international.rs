use crate::errors::ParserError;
use crate::model::{SaleSource, SourceFrame};
use crate::registry::SalesReportParser;

use super::common::{normalize_report, ColumnMapping, CountryField};

/// Value written to `country` for every international row; the export has no
/// country column.
pub const INTERNATIONAL_COUNTRY: &str = "International";

pub struct InternationalReportParser;

impl Default for InternationalReportParser {
    fn default() -> Self {
        Self
    }
}

impl InternationalReportParser {
    const NAME: &'static str = "INTERNATIONAL_REPORT";

    const MAPPING: ColumnMapping = ColumnMapping {
        order_date: "DATE",
        sku: "SKU",
        quantity: "PCS",
        revenue: "GROSS AMT",
        country: CountryField::Fixed(INTERNATIONAL_COUNTRY),
    };
}

impl SalesReportParser for InternationalReportParser {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn source(&self) -> SaleSource {
        SaleSource::International
    }

    fn parse(&self, content: &[u8]) -> Result<SourceFrame, ParserError> {
        let records = normalize_report(Self::NAME, self.source(), &Self::MAPPING, content)?;
        Ok(SourceFrame {
            source: self.source(),
            records,
        })
    }
}
