//! lm-protocol: Shared types for lovematch.
//!
//! This crate defines the data model passed between the scoring engine,
//! the history store, and the terminal frontend.

pub mod person;
pub mod record;
pub mod zodiac;

pub use person::{validate_pair, Field, Party, PersonDraft, PersonRecord, ValidationError};
pub use record::{CompatibilityResult, HistoryRecord, ScoreBreakdown};
pub use zodiac::{ParseZodiacError, ZodiacSign};
