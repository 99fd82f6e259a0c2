use std::fs;
use std::path::Path;

use crate::errors::ParserError;
use crate::formats::{DomesticReportParser, InternationalReportParser};
use crate::model::{SaleSource, SourceFrame};

pub trait SalesReportParser {
    fn name(&self) -> &'static str;
    fn source(&self) -> SaleSource;
    fn parse(&self, content: &[u8]) -> Result<SourceFrame, ParserError>;
}

pub fn parser_for(source: SaleSource) -> Box<dyn SalesReportParser> {
    match source {
        SaleSource::Domestic => Box::new(DomesticReportParser),
        SaleSource::International => Box::new(InternationalReportParser),
    }
}

pub fn parse_report(content: &[u8], source: SaleSource) -> Result<SourceFrame, ParserError> {
    parser_for(source).parse(content)
}

pub fn parse_report_file(path: &Path, source: SaleSource) -> Result<SourceFrame, ParserError> {
    let content = fs::read(path).map_err(|err| ParserError::Io {
        path: path.to_path_buf(),
        source: err,
    })?;
    parse_report(&content, source)
}
