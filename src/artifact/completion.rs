//! Tracking the end of a visit.

use std::sync::{Arc, Condvar, Mutex, PoisonError};

use thiserror::Error;

use super::selector::SelectionError;
use super::ArtifactError;
use crate::component::ArtifactIdentifier;

/// A failure reported during a visit.
#[derive(Debug, Error)]
pub enum ArtifactFailure {
    #[error("could not resolve {artifact}: {source}")]
    Artifact {
        artifact: ArtifactIdentifier,
        #[source]
        source: ArtifactError,
    },

    #[error(transparent)]
    Selection(SelectionError),
}

/// All failures of one visit.
#[derive(Debug, Error)]
#[error("{} artifact failure(s) during visit", .failures.len())]
pub struct VisitFailure {
    pub failures: Vec<ArtifactFailure>,
}

/// Handle on the outstanding work of a visit.
///
/// [`wait`](Self::wait) blocks until every submitted unit has finished,
/// whether it succeeded, failed, or was dropped without running.
#[must_use = "a visit is only complete once its Completion has been waited on"]
pub struct Completion(State);

enum State {
    Ready(Vec<ArtifactFailure>),
    Pending(Arc<Tracker>),
    All(Vec<Completion>),
}

impl Completion {
    /// A visit with nothing left to do.
    pub fn ready() -> Self {
        Self(State::Ready(Vec::new()))
    }

    pub(crate) fn failed(failures: Vec<ArtifactFailure>) -> Self {
        Self(State::Ready(failures))
    }

    pub(crate) fn pending(tracker: Arc<Tracker>) -> Self {
        Self(State::Pending(tracker))
    }

    /// Completes when every part completes.
    pub fn all(parts: Vec<Completion>) -> Self {
        Self(State::All(parts))
    }

    /// Block until the visit finishes, returning every failure it saw.
    pub fn wait(self) -> Result<(), VisitFailure> {
        let failures = self.into_failures();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(VisitFailure { failures })
        }
    }

    fn into_failures(self) -> Vec<ArtifactFailure> {
        match self.0 {
            State::Ready(failures) => failures,
            State::Pending(tracker) => tracker.wait(),
            State::All(parts) => parts
                .into_iter()
                .flat_map(Completion::into_failures)
                .collect(),
        }
    }
}

/// Counts down the units of a visit.
pub(crate) struct Tracker {
    state: Mutex<TrackerState>,
    done: Condvar,
}

struct TrackerState {
    remaining: usize,
    failures: Vec<ArtifactFailure>,
}

impl Tracker {
    pub(crate) fn new(units: usize) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(TrackerState {
                remaining: units,
                failures: Vec::new(),
            }),
            done: Condvar::new(),
        })
    }

    /// A report slot for one unit. Dropping it unreported counts the unit
    /// as interrupted.
    pub(crate) fn unit(self: &Arc<Self>, artifact: ArtifactIdentifier) -> UnitReport {
        UnitReport {
            tracker: Arc::clone(self),
            artifact,
            reported: false,
        }
    }

    fn finish(&self, failure: Option<ArtifactFailure>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.remaining = state.remaining.saturating_sub(1);
        if let Some(failure) = failure {
            state.failures.push(failure);
        }
        if state.remaining == 0 {
            self.done.notify_all();
        }
    }

    fn wait(&self) -> Vec<ArtifactFailure> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        while state.remaining > 0 {
            state = self
                .done
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        std::mem::take(&mut state.failures)
    }
}

/// Outcome slot for one unit of a visit.
pub(crate) struct UnitReport {
    tracker: Arc<Tracker>,
    artifact: ArtifactIdentifier,
    reported: bool,
}

impl UnitReport {
    pub(crate) fn succeeded(mut self) {
        self.reported = true;
        self.tracker.finish(None);
    }

    pub(crate) fn failed(mut self, failure: ArtifactFailure) {
        self.reported = true;
        self.tracker.finish(Some(failure));
    }
}

impl Drop for UnitReport {
    fn drop(&mut self) {
        if !self.reported {
            tracing::debug!(artifact = %self.artifact, "unit dropped before reporting");
            self.tracker.finish(Some(ArtifactFailure::Artifact {
                artifact: self.artifact.clone(),
                source: ArtifactError::Interrupted,
            }));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentIdentifier;
    use std::thread;

    fn artifact(name: &str) -> ArtifactIdentifier {
        ArtifactIdentifier::new(ComponentIdentifier::project(":app"), name)
    }

    #[test]
    fn test_ready_completion() {
        assert!(Completion::ready().wait().is_ok());
    }

    #[test]
    fn test_waits_for_all_units() {
        let tracker = Tracker::new(3);
        let reports: Vec<UnitReport> = (0..3)
            .map(|i| tracker.unit(artifact(&format!("a{i}.jar"))))
            .collect();
        let completion = Completion::pending(tracker);

        let handles: Vec<_> = reports
            .into_iter()
            .enumerate()
            .map(|(i, report)| {
                thread::spawn(move || {
                    if i == 1 {
                        report.failed(ArtifactFailure::Artifact {
                            artifact: artifact("a1.jar"),
                            source: ArtifactError::MissingFile("/nope".into()),
                        });
                    } else {
                        report.succeeded();
                    }
                })
            })
            .collect();

        let err = completion.wait().unwrap_err();
        assert_eq!(err.failures.len(), 1);
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_dropped_unit_counts_as_interrupted() {
        let tracker = Tracker::new(1);
        drop(tracker.unit(artifact("lost.jar")));

        let err = Completion::pending(tracker).wait().unwrap_err();
        assert!(matches!(
            err.failures.as_slice(),
            [ArtifactFailure::Artifact {
                source: ArtifactError::Interrupted,
                ..
            }]
        ));
    }

    #[test]
    fn test_all_aggregates_failures() {
        let completion = Completion::all(vec![
            Completion::ready(),
            Completion::failed(vec![ArtifactFailure::Artifact {
                artifact: artifact("x.jar"),
                source: ArtifactError::Interrupted,
            }]),
            Completion::failed(vec![ArtifactFailure::Artifact {
                artifact: artifact("y.jar"),
                source: ArtifactError::Interrupted,
            }]),
        ]);

        let err = completion.wait().unwrap_err();
        assert_eq!(err.failures.len(), 2);
        assert_eq!(err.to_string(), "2 artifact failure(s) during visit");
    }
}
