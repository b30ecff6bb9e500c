//! Application state for one run of the form.
//!
//! Holds the two drafts, the busy flag, the latest result and the history
//! store. Every user action maps to one method here; the frontend only
//! renders what this struct exposes.

use std::time::Duration;

use lm_protocol::{
    validate_pair, CompatibilityResult, Field, HistoryRecord, Party, PersonDraft, PersonRecord,
    ValidationError,
};
use lm_storage::{HistoryStore, KeyValueStore, StorageError};
use tracing::{info, warn};

use crate::scoring::{compute_compatibility, ScoreSource};
use crate::share::{ShareError, ShareOutcome, ShareTarget, SHARE_TITLE};

/// Result of a successful submit.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub result: CompatibilityResult,
    /// Set when the history record could not be written to storage. The
    /// record is still kept in memory for this session.
    pub persist_error: Option<StorageError>,
}

/// A validated pair waiting to be scored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmit {
    person1: PersonRecord,
    person2: PersonRecord,
}

impl PendingSubmit {
    pub fn people(&self) -> (&PersonRecord, &PersonRecord) {
        (&self.person1, &self.person2)
    }
}

/// Clears the busy flag if the analysis delay is abandoned.
struct BusyGuard<'a> {
    busy: &'a mut bool,
    armed: bool,
}

impl BusyGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            *self.busy = false;
        }
    }
}

pub struct Session<S: KeyValueStore, D: ScoreSource> {
    person1: PersonDraft,
    person2: PersonDraft,
    busy: bool,
    result: Option<CompatibilityResult>,
    show_history: bool,
    history: HistoryStore<S>,
    source: D,
    delay: Duration,
}

/// Local wall-clock timestamp used for history records.
pub fn timestamp_now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

impl<S: KeyValueStore, D: ScoreSource> Session<S, D> {
    pub fn new(history: HistoryStore<S>, source: D) -> Self {
        Self {
            person1: PersonDraft::default(),
            person2: PersonDraft::default(),
            busy: false,
            result: None,
            show_history: false,
            history,
            source,
            delay: Duration::ZERO,
        }
    }

    /// Pause applied by [`Session::analyze`] before computing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn draft(&self, party: Party) -> &PersonDraft {
        match party {
            Party::First => &self.person1,
            Party::Second => &self.person2,
        }
    }

    pub fn set_field(&mut self, party: Party, field: Field, value: impl Into<String>) {
        match party {
            Party::First => self.person1.set(field, value),
            Party::Second => self.person2.set(field, value),
        }
    }

    pub fn set_draft(&mut self, party: Party, draft: PersonDraft) {
        match party {
            Party::First => self.person1 = draft,
            Party::Second => self.person2 = draft,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn result(&self) -> Option<&CompatibilityResult> {
        self.result.as_ref()
    }

    pub fn history(&self) -> &[HistoryRecord] {
        self.history.records()
    }

    pub fn history_visible(&self) -> bool {
        self.show_history
    }

    /// Validate both drafts, score them, and record the result.
    ///
    /// On a validation error nothing changes. Otherwise any previous result
    /// is replaced and a history record is prepended; a storage failure is
    /// logged and returned in the outcome rather than as an error.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, ValidationError> {
        let pending = self.begin_submit()?;
        Ok(self.analyze(pending).await)
    }

    /// Validate both drafts and enter the busy state.
    ///
    /// Clears the previous result. On a validation error nothing changes.
    pub fn begin_submit(&mut self) -> Result<PendingSubmit, ValidationError> {
        let (person1, person2) = match validate_pair(&self.person1, &self.person2) {
            Ok(pair) => pair,
            Err(e) => {
                info!(error = %e, "submit rejected");
                return Err(e);
            }
        };
        self.busy = true;
        self.result = None;
        Ok(PendingSubmit { person1, person2 })
    }

    /// Wait out the analysis delay, then finish the submit.
    ///
    /// Dropping the returned future before it completes leaves the session
    /// idle with no result and no new history record.
    pub async fn analyze(&mut self, pending: PendingSubmit) -> SubmitOutcome {
        if !self.delay.is_zero() {
            let guard = BusyGuard {
                busy: &mut self.busy,
                armed: true,
            };
            tokio::time::sleep(self.delay).await;
            guard.disarm();
        }
        self.finish_submit(pending)
    }

    /// Score a validated pair, leave the busy state and record the result.
    pub fn finish_submit(&mut self, pending: PendingSubmit) -> SubmitOutcome {
        let PendingSubmit { person1, person2 } = pending;
        let result = compute_compatibility(&person1, &person2, &mut self.source);
        self.result = Some(result.clone());
        self.busy = false;

        let record = HistoryRecord::new(timestamp_now(), &person1, &person2, &result);
        let persist_error = match self.history.append(record) {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, "failed to persist history");
                Some(e)
            }
        };

        SubmitOutcome {
            result,
            persist_error,
        }
    }

    /// Flip history visibility and return the new state.
    pub fn toggle_history(&mut self) -> bool {
        self.show_history = !self.show_history;
        self.show_history
    }

    /// Clear history if the user confirmed. Returns whether it was cleared.
    ///
    /// In-memory history is emptied even when removing the stored copy fails.
    pub fn clear_history(&mut self, confirmed: bool) -> Result<bool, StorageError> {
        if !confirmed {
            return Ok(false);
        }
        self.history.clear()?;
        Ok(true)
    }

    /// Hand the latest analysis to `target`. `None` when there is no result yet.
    pub fn share(
        &self,
        target: &mut dyn ShareTarget,
    ) -> Result<Option<ShareOutcome>, ShareError> {
        match &self.result {
            Some(result) => target.share(SHARE_TITLE, &result.analysis).map(Some),
            None => Ok(None),
        }
    }
}
