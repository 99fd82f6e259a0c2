mod common;
mod domestic;
mod international;

pub use domestic::DomesticReportParser;
pub use international::{InternationalReportParser, INTERNATIONAL_COUNTRY};
