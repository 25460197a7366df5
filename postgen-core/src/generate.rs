//! One generation cycle: fetch, gate on change, validate, rank, render.

use crate::clock::Clock;
use crate::error::PostgenResult;
use crate::event::rank_events;
use crate::fingerprint::{ChangeDetector, SheetStatus};
use crate::probe::{LivenessProber, StatusSource};
use crate::render::{DEFAULT_FORM_URL, render_post};
use crate::sheet::{SheetSource, parse_sheet};
use crate::store::KeyValueStore;
use crate::validate::validate_sheet;

/// Key of the last rendered post in the state store.
pub const POST_KEY: &str = "post.md";

/// Result of [`Generator::generate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub markdown: String,
    pub fingerprint: String,
    /// `false` when a stored post was reused for an unchanged sheet.
    pub regenerated: bool,
    pub accepted: usize,
    pub removed: usize,
}

/// Owns every collaborator a generation cycle needs.
///
/// `state` holds the sheet fingerprint and the last rendered post.
pub struct Generator<Src, St, S, C, K> {
    source: Src,
    state: St,
    prober: LivenessProber<S, C>,
    clock: K,
    form_url: String,
}

impl<Src, St, S, C, K> Generator<Src, St, S, C, K>
where
    Src: SheetSource,
    St: KeyValueStore,
    S: StatusSource,
    C: KeyValueStore,
    K: Clock,
{
    pub fn new(source: Src, state: St, prober: LivenessProber<S, C>, clock: K) -> Self {
        Generator {
            source,
            state,
            prober,
            clock,
            form_url: DEFAULT_FORM_URL.to_string(),
        }
    }

    pub fn with_form_url(mut self, form_url: impl Into<String>) -> Self {
        self.form_url = form_url.into();
        self
    }

    /// Produce the post for the current sheet.
    ///
    /// With `use_cache`, an unchanged sheet reuses the stored post verbatim.
    /// A failed fetch is returned as an error; no stored post stands in.
    pub fn generate(&mut self, use_cache: bool) -> PostgenResult<Post> {
        let raw = self.source.fetch()?;
        // Parse before recording the fingerprint so a broken export is
        // never remembered as seen.
        let sheet = parse_sheet(&raw)?;

        let (fingerprint, status) = ChangeDetector::new(&mut self.state).check(&raw)?;

        if use_cache && status == SheetStatus::Unchanged {
            if let Some(markdown) = self.state.get(POST_KEY)? {
                tracing::info!(fingerprint = %fingerprint, "Reusing stored post");
                return Ok(Post {
                    markdown,
                    fingerprint,
                    regenerated: false,
                    accepted: 0,
                    removed: 0,
                });
            }
            tracing::info!("No stored post to reuse, regenerating");
        }

        let now = self.clock.now();
        let mut validation = validate_sheet(sheet, now, &mut self.prober);
        rank_events(&mut validation.events);

        let markdown = render_post(&validation.events, &mut self.prober, now, &self.form_url);
        self.state.put(POST_KEY, &markdown)?;

        Ok(Post {
            markdown,
            fingerprint,
            regenerated: true,
            accepted: validation.events.len(),
            removed: validation.removed,
        })
    }

    pub fn state(&self) -> &St {
        &self.state
    }

    pub fn prober(&self) -> &LivenessProber<S, C> {
        &self.prober
    }
}
