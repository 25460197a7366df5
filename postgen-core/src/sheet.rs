//! The community spreadsheet: fetching its CSV export and reading rows.

use serde::Deserialize;

use crate::error::{PostgenError, PostgenResult};

/// Column names the form writes into the header row.
pub const COLUMNS: [&str; 8] = [
    "Timestamp",
    "Date",
    "Event Type",
    "Start Time",
    "End Time",
    "Location",
    "Link",
    "Reddit Username",
];

/// One spreadsheet row exactly as submitted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawSubmission {
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Event Type")]
    pub event_type: String,
    #[serde(rename = "Start Time")]
    pub start_time: String,
    #[serde(rename = "End Time")]
    pub end_time: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Link")]
    pub link: String,
    #[serde(rename = "Reddit Username")]
    pub username: String,
}

/// Rows read from a sheet export.
#[derive(Debug, Default)]
pub struct ParsedSheet {
    pub rows: Vec<RawSubmission>,
    /// Rows the CSV reader could not decode at all.
    pub unreadable: usize,
}

/// Read the CSV export. A header missing any form column fails the whole
/// sheet; a single undecodable row is only counted.
pub fn parse_sheet(raw: &str) -> PostgenResult<ParsedSheet> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(raw.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| PostgenError::SheetFormat(e.to_string()))?
        .clone();

    let missing: Vec<&str> = COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(PostgenError::SheetFormat(format!(
            "missing column(s): {}",
            missing.join(", ")
        )));
    }

    let mut sheet = ParsedSheet::default();
    for (i, row) in reader.deserialize::<RawSubmission>().enumerate() {
        match row {
            Ok(row) => sheet.rows.push(row),
            Err(e) => {
                tracing::debug!(row = i + 1, error = %e, "Skipping unreadable row");
                sheet.unreadable += 1;
            }
        }
    }

    Ok(sheet)
}

/// Where the raw sheet export comes from.
pub trait SheetSource {
    fn fetch(&self) -> PostgenResult<String>;
}

/// Downloads the export over HTTP.
pub struct HttpSheetSource {
    client: reqwest::blocking::Client,
    url: String,
}

impl HttpSheetSource {
    pub fn new(client: reqwest::blocking::Client, url: impl Into<String>) -> Self {
        HttpSheetSource {
            client,
            url: url.into(),
        }
    }
}

impl SheetSource for HttpSheetSource {
    fn fetch(&self) -> PostgenResult<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| PostgenError::SheetFetch(e.to_string()))?;

        // The export does not always declare a charset; it is always UTF-8.
        let body = response
            .bytes()
            .map_err(|e| PostgenError::SheetFetch(e.to_string()))?;

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// A sheet held in memory.
impl SheetSource for String {
    fn fetch(&self) -> PostgenResult<String> {
        Ok(self.clone())
    }
}
