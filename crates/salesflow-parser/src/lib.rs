pub mod coerce;
pub mod errors;
pub mod formats;
pub mod model;
mod registry;

pub use errors::ParserError;
pub use model::{
    records_to_dataframe, NormalizedSale, SaleKey, SaleSource, SourceFrame, CANONICAL_COLUMNS,
    ORDER_DATE_FORMAT,
};
pub use registry::{parse_report, parse_report_file, parser_for, SalesReportParser};
