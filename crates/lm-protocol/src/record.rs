//! Scoring results and their persisted history snapshots.

use serde::{Deserialize, Serialize};

use crate::person::PersonRecord;

/// The individual terms that produced a score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreBreakdown {
    /// Uniform draw in `0..=99`.
    pub base: i32,
    /// Uniform draw in `-10..=9`.
    pub zodiac_adjustment: i32,
    /// Absolute age difference in years.
    pub age_gap: u32,
    /// `+5`, `0` or `-5` depending on `age_gap`.
    pub age_adjustment: i32,
}

/// Output of the scoring engine. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityResult {
    /// Final score, always in `0..=100`.
    pub score: u8,
    /// Human-readable analysis shown to the user and shared.
    pub analysis: String,
    pub breakdown: ScoreBreakdown,
}

/// One persisted scoring event.
///
/// The serialized shape (`date`, `person1`, `person2`, `score`, `analysis`)
/// is the element shape of the stored history array.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryRecord {
    #[serde(rename = "date")]
    pub timestamp: String,
    pub person1: PersonRecord,
    pub person2: PersonRecord,
    pub score: u8,
    pub analysis: String,
}

impl HistoryRecord {
    /// Snapshot a result together with the two people it was computed for.
    pub fn new(
        timestamp: impl Into<String>,
        person1: &PersonRecord,
        person2: &PersonRecord,
        result: &CompatibilityResult,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            person1: person1.clone(),
            person2: person2.clone(),
            score: result.score,
            analysis: result.analysis.clone(),
        }
    }
}
