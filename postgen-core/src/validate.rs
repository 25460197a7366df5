//! Inclusion policy for submissions.
//!
//! Checks run in a fixed order and the first failure decides the rejection:
//! parseable times, not yet over, well-formed link, real submitter. The last
//! check costs a network probe, so everything cheap goes first.

use chrono::{Datelike, NaiveDateTime};
use url::{Host, Url};

use crate::error::Rejection;
use crate::event::Event;
use crate::probe::{LivenessProber, StatusSource};
use crate::sheet::{ParsedSheet, RawSubmission};
use crate::store::KeyValueStore;
use crate::temporal::{parse_event_instant, parse_submission_timestamp, roll_end_past_start};

/// Outcome of validating a whole sheet.
#[derive(Debug, Default)]
pub struct Validation {
    /// Accepted events in sheet order.
    pub events: Vec<Event>,
    /// Rows left out, including rows the CSV reader could not decode.
    pub removed: usize,
}

/// Validate every row of `sheet` in order.
pub fn validate_sheet<S, C>(
    sheet: ParsedSheet,
    now: NaiveDateTime,
    prober: &mut LivenessProber<S, C>,
) -> Validation
where
    S: StatusSource,
    C: KeyValueStore,
{
    let mut validation = Validation {
        events: Vec::with_capacity(sheet.rows.len()),
        removed: sheet.unreadable,
    };

    for (i, raw) in sheet.rows.iter().enumerate() {
        match validate_submission(raw, now, prober) {
            Ok(event) => validation.events.push(event),
            Err(rejection) => {
                tracing::debug!(row = i + 1, reason = %rejection, "Submission removed");
                validation.removed += 1;
            }
        }
    }

    tracing::info!(
        accepted = validation.events.len(),
        removed = validation.removed,
        "{} events removed",
        validation.removed
    );
    validation
}

/// Turn one submission into an [`Event`], or say why it was left out.
pub fn validate_submission<S, C>(
    raw: &RawSubmission,
    now: NaiveDateTime,
    prober: &mut LivenessProber<S, C>,
) -> Result<Event, Rejection>
where
    S: StatusSource,
    C: KeyValueStore,
{
    let submitted = parse_submission_timestamp(&raw.timestamp)?;
    let year = submitted.year();

    let start = parse_event_instant(&raw.date, year, &raw.start_time)?;

    let end = if raw.end_time.trim().is_empty() {
        if start < now {
            return Err(Rejection::Stale);
        }
        None
    } else {
        let end = parse_event_instant(&raw.date, year, &raw.end_time)?;
        let end = roll_end_past_start(start, end);
        if end < now || end < start {
            return Err(Rejection::Stale);
        }
        Some(end)
    };

    let link = raw.link.trim();
    if !link.is_empty() && !is_valid_link(link) {
        return Err(Rejection::InvalidLink(link.to_string()));
    }

    if !prober.user_exists(&raw.username) {
        return Err(Rejection::UnknownSubmitter(raw.username.trim().to_string()));
    }

    Ok(Event {
        event_type: raw.event_type.clone(),
        start,
        end,
        location: raw.location.clone(),
        link: link.to_string(),
    })
}

/// Whether `link` is an absolute web URL with a real host.
pub fn is_valid_link(link: &str) -> bool {
    if link.chars().any(char::is_whitespace) {
        return false;
    }

    let Ok(url) = Url::parse(link) else {
        return false;
    };

    if !matches!(url.scheme(), "http" | "https" | "ftp") {
        return false;
    }

    match url.host() {
        Some(Host::Domain(domain)) => {
            let labels: Vec<&str> = domain.trim_end_matches('.').split('.').collect();
            labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
        }
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        None => false,
    }
}
