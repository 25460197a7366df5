//! Markdown rendering of the event table.

use chrono::NaiveDateTime;
use url::Url;

use crate::event::Event;
use crate::probe::{LivenessProber, StatusSource};
use crate::store::KeyValueStore;

pub const DEFAULT_FORM_URL: &str = "http://goo.gl/forms/f0fWwjTa7oOgsYIs1";

const HEADER: [&str; 5] = ["Day", "Type", "Time", "Location", "Link"];
const SEPARATOR: &str = "---";

/// The full post: call to action, table, and "Last Updated" footer.
pub fn render_post<S, C>(
    events: &[Event],
    prober: &mut LivenessProber<S, C>,
    now: NaiveDateTime,
    form_url: &str,
) -> String
where
    S: StatusSource,
    C: KeyValueStore,
{
    format!(
        "**To have your event added please fill out [this form]({form_url}) and it will be included ASAP**\n\n\
         {}\n\n\
         **Last Updated: {}**",
        render_table(events, prober),
        now.format("%I:%M %p %m/%d"),
    )
}

/// Header row, separator row, then one row per event.
pub fn render_table<S, C>(events: &[Event], prober: &mut LivenessProber<S, C>) -> String
where
    S: StatusSource,
    C: KeyValueStore,
{
    let mut rows = Vec::with_capacity(events.len() + 2);
    rows.push(HEADER.join(" | "));
    rows.push([SEPARATOR; HEADER.len()].join(" | "));
    rows.extend(events.iter().map(|event| render_row(event, prober).join(" | ")));
    rows.join("\n")
}

fn render_row<S, C>(event: &Event, prober: &mut LivenessProber<S, C>) -> [String; 5]
where
    S: StatusSource,
    C: KeyValueStore,
{
    let time = match event.end {
        Some(end) => format!("{} - {}", clock(event.start), clock(end)),
        None => clock(event.start),
    };

    [
        event.start.format("%a %b %d").to_string(),
        event.event_type.clone(),
        time,
        event.location.clone(),
        link_cell(&event.link, prober),
    ]
}

/// A labeled markdown link when the target is confirmed live, else empty.
fn link_cell<S, C>(link: &str, prober: &mut LivenessProber<S, C>) -> String
where
    S: StatusSource,
    C: KeyValueStore,
{
    let link = link.trim();
    if link.is_empty() || !prober.is_live(link) {
        return String::new();
    }
    format!("[{}]({})", link_label(link), link)
}

/// Label shown for a link, picked from its host.
pub fn link_label(link: &str) -> &'static str {
    let host = Url::parse(link)
        .ok()
        .and_then(|url| url.host_str().map(str::to_ascii_lowercase))
        .unwrap_or_else(|| link.to_ascii_lowercase());

    if host.contains("facebook") {
        "facebook"
    } else if host.contains("reddit") {
        "post"
    } else {
        "link"
    }
}

/// 12-hour clock without a leading zero, e.g. `9:00AM`.
fn clock(t: NaiveDateTime) -> String {
    t.format("%-I:%M%p").to_string()
}
