//! Background job filling in missing countries of origin.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use marquee_core::{RecordStore, TitleRecord};

use crate::config::DEFAULT_PACING_MS;
use crate::enrich::lookup::CountryLookup;
use crate::enrich::resilience::Pacer;
use crate::error::{EnrichError, EnrichResult};

/// Lifecycle of a [`CountryFillJob`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// Counts for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FillSummary {
    /// Records that had no country when the run started.
    pub candidates: usize,
    pub updated: usize,
    /// The lookup had no answer, or the record was filled meanwhile.
    pub skipped: usize,
    pub failed: usize,
    /// The run stopped early on request.
    pub cancelled: bool,
}

impl FillSummary {
    /// Candidates the run never got to.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.candidates
            .saturating_sub(self.updated + self.skipped + self.failed)
    }
}

enum FillOutcome {
    Updated,
    Skipped,
    Failed,
}

#[derive(Debug)]
struct RunSlot {
    state: JobState,
    token: Option<CancellationToken>,
}

/// Resolves the country of every record that lacks one, one title at a
/// time, persisting each answer as soon as it arrives.
///
/// Lookups are spaced by a minimum pacing interval. A run can be stopped
/// from any task with [`request_cancel`](Self::request_cancel); records
/// already filled stay filled and the next run picks up the rest.
pub struct CountryFillJob {
    store: Arc<dyn RecordStore>,
    lookup: Arc<dyn CountryLookup>,
    pacing: Duration,
    slot: Mutex<RunSlot>,
}

impl std::fmt::Debug for CountryFillJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CountryFillJob")
            .field("lookup", &self.lookup.source_name())
            .field("pacing", &self.pacing)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl CountryFillJob {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, lookup: Arc<dyn CountryLookup>) -> Self {
        Self {
            store,
            lookup,
            pacing: Duration::from_millis(DEFAULT_PACING_MS),
            slot: Mutex::new(RunSlot {
                state: JobState::Idle,
                token: None,
            }),
        }
    }

    /// Minimum delay between two lookups, clamped to at least 1 ms.
    #[must_use]
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing.max(Duration::from_millis(1));
        self
    }

    #[must_use]
    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    #[must_use]
    pub fn state(&self) -> JobState {
        self.lock_slot().state
    }

    /// Ask the running pass to stop before its next title.
    ///
    /// Returns `false` when no run is in progress; a request made then is
    /// not remembered for a later run.
    pub fn request_cancel(&self) -> bool {
        let slot = self.lock_slot();
        match &slot.token {
            Some(token) if slot.state == JobState::Running => {
                log::info!("Cancellation requested for country fill");
                token.cancel();
                true
            }
            _ => false,
        }
    }

    /// Run one pass over every record without a country.
    ///
    /// Lookup failures are counted and logged, never returned.
    ///
    /// # Errors
    /// [`EnrichError::AlreadyRunning`] if a pass is in progress, or a store
    /// error if the candidates cannot be read or the store becomes
    /// unavailable.
    pub async fn start(&self) -> EnrichResult<FillSummary> {
        let token = self.begin()?;
        let mut guard = RunGuard {
            slot: &self.slot,
            outcome: JobState::Cancelled,
        };

        let result = self.run(&token).await;
        guard.outcome = match &result {
            Ok(summary) if summary.cancelled => JobState::Cancelled,
            Ok(_) => JobState::Completed,
            Err(_) => JobState::Idle,
        };
        result
    }

    fn begin(&self) -> EnrichResult<CancellationToken> {
        let mut slot = self.lock_slot();
        if slot.state == JobState::Running {
            return Err(EnrichError::AlreadyRunning);
        }
        let token = CancellationToken::new();
        slot.state = JobState::Running;
        slot.token = Some(token.clone());
        Ok(token)
    }

    async fn run(&self, token: &CancellationToken) -> EnrichResult<FillSummary> {
        let candidates = self.store.find_missing_country()?;
        let mut summary = FillSummary {
            candidates: candidates.len(),
            ..FillSummary::default()
        };
        log::info!(
            "Country fill: {} titles without a country, using {}",
            candidates.len(),
            self.lookup.source_name()
        );

        let pacer = Pacer::new(self.pacing);
        for record in &candidates {
            if token.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            tokio::select! {
                biased;
                () = token.cancelled() => {
                    summary.cancelled = true;
                    break;
                }
                () = pacer.acquire() => {}
            }

            match self.fill_one(record).await? {
                FillOutcome::Updated => summary.updated += 1,
                FillOutcome::Skipped => summary.skipped += 1,
                FillOutcome::Failed => summary.failed += 1,
            }
        }

        log::info!(
            "Country fill {}: {} updated, {} skipped, {} failed, {} remaining",
            if summary.cancelled { "cancelled" } else { "finished" },
            summary.updated,
            summary.skipped,
            summary.failed,
            summary.remaining()
        );
        Ok(summary)
    }

    async fn fill_one(&self, record: &TitleRecord) -> EnrichResult<FillOutcome> {
        let title = if record.title.trim().is_empty() {
            record.original_title.as_str()
        } else {
            record.title.as_str()
        };
        if title.trim().is_empty() {
            log::debug!("Skipping {}: no title to search for", record.id);
            return Ok(FillOutcome::Skipped);
        }

        let country = match self.lookup.resolve(title, record.year).await {
            Ok(Some(country)) => country,
            Ok(None) => {
                log::info!("No country found for {}", record.display_name());
                return Ok(FillOutcome::Skipped);
            }
            Err(e) if e.is_not_found() => {
                log::info!("No country found for {}: {}", record.display_name(), e);
                return Ok(FillOutcome::Skipped);
            }
            Err(e) => {
                log::warn!("Lookup failed for {}: {}", record.display_name(), e);
                return Ok(FillOutcome::Failed);
            }
        };

        match self.store.set_country(&record.id, &country) {
            Ok(true) => {
                log::info!("Updated {} -> {}", record.display_name(), country);
                Ok(FillOutcome::Updated)
            }
            Ok(false) => {
                log::debug!("{} already has a country", record.id);
                Ok(FillOutcome::Skipped)
            }
            Err(e) if e.is_store_unavailable() => Err(e.into()),
            Err(e) => {
                log::warn!("Failed to save country for {}: {}", record.id, e);
                Ok(FillOutcome::Failed)
            }
        }
    }

    fn lock_slot(&self) -> MutexGuard<'_, RunSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Leaves the slot in its final state however the run ends. A run whose
/// future is dropped counts as cancelled.
struct RunGuard<'a> {
    slot: &'a Mutex<RunSlot>,
    outcome: JobState,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.state = self.outcome;
        slot.token = None;
    }
}
