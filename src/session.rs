//! Background report requests with stale-result dropping.
//!
//! Every submitted query gets a new [`Generation`]. Results travel back over
//! a channel tagged with their generation, and only the latest generation is
//! ever accepted, so a slow earlier query can never overwrite a newer one.

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::ClassifiedRecord;
use crate::report::{ReportEngine, ReportQuery};

/// Sequence number of a submitted query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

/// Message from a report task.
#[derive(Debug)]
pub enum ReportUpdate {
    Started {
        generation: Generation,
    },
    Finished {
        generation: Generation,
        result: Result<Vec<ClassifiedRecord>>,
    },
}

impl ReportUpdate {
    pub fn generation(&self) -> Generation {
        match self {
            Self::Started { generation } | Self::Finished { generation, .. } => *generation,
        }
    }
}

/// Accepted result of the latest query.
#[derive(Debug)]
pub struct ReportOutcome {
    pub generation: Generation,
    pub query: ReportQuery,
    pub result: Result<Vec<ClassifiedRecord>>,
}

/// Tracks the latest report request and discards superseded results.
pub struct ReportSession {
    engine: ReportEngine,
    rt: Handle,
    latest: Generation,
    latest_query: Option<ReportQuery>,
    in_flight: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<ReportUpdate>,
    rx: mpsc::UnboundedReceiver<ReportUpdate>,
}

impl ReportSession {
    /// Create a new session spawning report tasks on `rt`.
    pub fn new(engine: ReportEngine, rt: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            engine,
            rt,
            latest: Generation(0),
            latest_query: None,
            in_flight: None,
            tx,
            rx,
        }
    }

    /// Start a query in the background, superseding any earlier one.
    ///
    /// Submitting the query that is already running returns its generation
    /// instead of starting a second fetch.
    pub fn submit(&mut self, query: ReportQuery) -> Generation {
        if self.is_running() && self.latest_query == Some(query) {
            debug!("Query already in flight as {:?}", self.latest);
            return self.latest;
        }

        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }

        self.latest = Generation(self.latest.0 + 1);
        self.latest_query = Some(query);

        let generation = self.latest;
        let engine = self.engine.clone();
        let tx = self.tx.clone();

        self.in_flight = Some(self.rt.spawn(async move {
            let _ = tx.send(ReportUpdate::Started { generation });
            let result = engine.run(&query).await;
            let _ = tx.send(ReportUpdate::Finished { generation, result });
        }));

        generation
    }

    /// Generation of the most recent submission.
    pub fn latest(&self) -> Generation {
        self.latest
    }

    /// Whether the latest query has not finished yet.
    pub fn is_running(&self) -> bool {
        self.in_flight.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Check whether a generation is still the one being waited for.
    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.latest
    }

    /// Apply an update, returning the outcome if it belongs to the latest query.
    pub fn apply(&mut self, update: ReportUpdate) -> Option<ReportOutcome> {
        let generation = update.generation();
        if !self.is_current(generation) {
            debug!("Dropping stale report update for {generation:?}");
            return None;
        }

        match update {
            ReportUpdate::Started { .. } => None,
            ReportUpdate::Finished { generation, result } => {
                self.in_flight = None;
                let query = self.latest_query?;
                Some(ReportOutcome {
                    generation,
                    query,
                    result,
                })
            }
        }
    }

    /// Drain pending updates without waiting.
    pub fn poll(&mut self) -> Option<ReportOutcome> {
        let mut outcome = None;
        while let Ok(update) = self.rx.try_recv() {
            if let Some(accepted) = self.apply(update) {
                outcome = Some(accepted);
            }
        }
        outcome
    }

    /// Wait for the latest query to finish.
    ///
    /// Returns `None` when nothing is running, or when the report task ends
    /// without sending a result (panic or abort).
    pub async fn next_outcome(&mut self) -> Option<ReportOutcome> {
        while let Some(handle) = self.in_flight.as_mut() {
            tokio::select! {
                Some(update) = self.rx.recv() => {
                    if let Some(outcome) = self.apply(update) {
                        return Some(outcome);
                    }
                }
                joined = handle => {
                    self.in_flight = None;
                    if let Err(e) = joined {
                        warn!("Report task for {:?} ended without a result: {e}", self.latest);
                    }
                }
            }
        }

        // The task may have sent its result just before finishing
        self.poll()
    }
}
