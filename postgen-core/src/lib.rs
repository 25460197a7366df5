//! Core pipeline for postgen.
//!
//! Turns the community event spreadsheet into a markdown post:
//! - `sheet` reads the CSV export into raw submissions
//! - `temporal` rebuilds absolute start/end instants from the form's fragments
//! - `validate` drops spam, stale and malformed submissions
//! - `probe` checks links and submitter profiles, with a memo cache
//! - `render` lays accepted events out as a markdown table
//! - `fingerprint` skips regeneration when the sheet has not changed
//! - `generate` wires one full cycle together

pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod fingerprint;
pub mod generate;
pub mod probe;
pub mod render;
pub mod sheet;
pub mod store;
pub mod temporal;
pub mod validate;

pub use error::{PostgenError, PostgenResult, Rejection};
pub use event::Event;
pub use generate::{Generator, Post};
