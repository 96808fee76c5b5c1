//! Report-number parsing
//!
//! Report numbers look like `PREFIX.dd-dd-2021.05` with an optional
//! `/NAME` or `/NAME-REV` suffix. No current report variant consumes
//! them; the helper is kept for callers that look reports up by number.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Error, Result};

static REPORT_NUMBER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\w+?\.\d{2}-\d{2}-(20\d{2})\.(\d{2})(?:/(\w+)(?:-(\d+))?)?$")
        .expect("report-number pattern is valid")
});

/// A parsed report number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportNumber {
    /// Reporting year
    pub year: i32,

    /// Reporting month
    pub month: u32,

    /// Optional report name suffix
    pub name: Option<String>,

    /// Optional revision of the named report
    pub revision: Option<u32>,
}

impl ReportNumber {
    /// Parse a raw report number
    ///
    /// A string that does not match the format yields
    /// [`Error::NoReportsFound`] rather than panicking.
    pub fn parse(raw: &str) -> Result<Self> {
        let captures = REPORT_NUMBER_RE
            .captures(raw)
            .ok_or_else(|| Error::NoReportsFound(format!("unparseable report number `{raw}`")))?;

        let year = captures[1]
            .parse()
            .map_err(|_| Error::NoReportsFound(format!("bad year in report number `{raw}`")))?;
        let month = captures[2]
            .parse()
            .map_err(|_| Error::NoReportsFound(format!("bad month in report number `{raw}`")))?;
        let name = captures.get(3).map(|m| m.as_str().to_string());
        let revision = match captures.get(4) {
            Some(m) => Some(m.as_str().parse().map_err(|_| {
                Error::NoReportsFound(format!("bad revision in report number `{raw}`"))
            })?),
            None => None,
        };

        Ok(Self {
            year,
            month,
            name,
            revision,
        })
    }
}
