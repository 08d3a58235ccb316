//! `BatchOrchestrator`: sequential fleet-wide lifecycle actions
//!
//! Drives one action across a host list, one remote call at a time, with a
//! fixed pause after every call. A failing host is recorded under the
//! `error` label and the batch moves on.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument, warn};
use vmfleet_client::RemoteApi;

use crate::action::{ActionOutcome, BatchAction};
use crate::hosts::HostEntry;
use crate::report::ProgressSink;
use crate::tally::{BatchResult, Tally};

/// Default pause after each per-host call
pub const DEFAULT_PACING: Duration = Duration::from_millis(100);

/// Runs lifecycle actions over a list of hosts
pub struct BatchOrchestrator {
    /// Management API the actions are sent to
    api: Arc<dyn RemoteApi>,
    /// Fixed delay after each call
    pacing: Duration,
}

impl BatchOrchestrator {
    /// Create an orchestrator with the default pacing
    pub fn new(api: Arc<dyn RemoteApi>) -> Self {
        Self {
            api,
            pacing: DEFAULT_PACING,
        }
    }

    /// Set the delay applied after each per-host call
    #[must_use]
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Run `action` against every host, in order
    ///
    /// Never fails: remote errors become [`ActionOutcome::Failure`] and are
    /// counted under the `error` label. Each outcome is passed to `sink`
    /// before the next host is contacted.
    #[instrument(skip(self, hosts, sink), fields(hosts = hosts.len()))]
    pub async fn run_batch(
        &self,
        hosts: &[HostEntry],
        action: BatchAction,
        sink: &mut dyn ProgressSink,
    ) -> BatchResult {
        let mut tally = Tally::new();

        info!(
            total_hosts = hosts.len(),
            pacing = ?self.pacing,
            "starting batch"
        );

        for host in hosts {
            let outcome = self.run_one(host, action).await;

            tally.record(outcome.label());
            sink.host_done(host, &outcome);

            self.pace().await;
        }

        let result = BatchResult::from(tally);

        info!(
            total = result.total_processed,
            failed = result.tally.get(crate::action::ERROR_LABEL),
            "batch finished"
        );

        result
    }

    /// Perform and classify a single host's action
    async fn run_one(&self, host: &HostEntry, action: BatchAction) -> ActionOutcome {
        match action.invoke(self.api.as_ref(), &host.remote_id).await {
            Ok(response) => {
                let outcome = ActionOutcome::from_response(action, &response);
                debug!(host = %host.name, id = %host.remote_id, state = outcome.label(), "host done");
                outcome
            }
            Err(e) => {
                warn!(host = %host.name, id = %host.remote_id, error = %e, "host failed");
                ActionOutcome::Failure {
                    error: error_chain(&e),
                }
            }
        }
    }

    /// Fixed post-call delay
    async fn pace(&self) {
        if !self.pacing.is_zero() {
            tokio::time::sleep(self.pacing).await;
        }
    }
}

/// Render an error with its causes, e.g. `... : tcp connect error: Connection refused`
///
/// A cause already printed at the end of the message so far is not repeated.
fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.ends_with(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use async_trait::async_trait;
    use vmfleet_client::{ClientError, Document, DocumentError, Result};

    use super::*;

    /// Answers every call with the same state
    struct FixedState(&'static str);

    #[async_trait]
    impl RemoteApi for FixedState {
        async fn fetch(&self, _path: &str) -> Result<Document> {
            let body = format!("<vm><status><state>{}</state></status></vm>", self.0);
            Ok(Document::parse(body.as_bytes())?)
        }

        async fn post_action(&self, _vm_id: &str, _verb: &str) -> Result<Document> {
            let body = format!("<action><status><state>{}</state></status></action>", self.0);
            Ok(Document::parse(body.as_bytes())?)
        }
    }

    /// Fails every call
    struct Unreachable;

    #[async_trait]
    impl RemoteApi for Unreachable {
        async fn fetch(&self, _path: &str) -> Result<Document> {
            Err(ClientError::Api {
                status: 503,
                message: "Service Unavailable".into(),
            })
        }

        async fn post_action(&self, vm_id: &str, _verb: &str) -> Result<Document> {
            self.fetch(vm_id).await
        }
    }

    #[derive(Default)]
    struct Lines(Vec<String>);

    impl ProgressSink for Lines {
        fn host_done(&mut self, host: &HostEntry, outcome: &ActionOutcome) {
            self.0.push(format!("{}={}", host.name, outcome.label()));
        }
    }

    fn hosts(n: usize) -> Vec<HostEntry> {
        (0..n)
            .map(|i| HostEntry::new(format!("vm{i}"), i.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let orchestrator =
            BatchOrchestrator::new(Arc::new(FixedState("up"))).with_pacing(Duration::ZERO);
        let mut sink = Lines::default();

        let result = orchestrator
            .run_batch(&[], BatchAction::Start, &mut sink)
            .await;

        assert_eq!(result.total_processed, 0);
        assert!(result.tally.is_empty());
        assert!(sink.0.is_empty());
    }

    #[tokio::test]
    async fn test_all_failures_still_processed() {
        let orchestrator =
            BatchOrchestrator::new(Arc::new(Unreachable)).with_pacing(Duration::ZERO);
        let mut sink = Lines::default();

        let result = orchestrator
            .run_batch(&hosts(4), BatchAction::Stop, &mut sink)
            .await;

        assert_eq!(result.total_processed, 4);
        assert_eq!(result.tally.get("error"), 4);
        assert_eq!(sink.0, vec!["vm0=error", "vm1=error", "vm2=error", "vm3=error"]);
    }

    #[tokio::test]
    async fn test_status_uses_vm_state() {
        let orchestrator =
            BatchOrchestrator::new(Arc::new(FixedState("down"))).with_pacing(Duration::ZERO);
        let mut sink = Lines::default();

        let result = orchestrator
            .run_batch(&hosts(2), BatchAction::Status, &mut sink)
            .await;

        assert_eq!(result.tally.get("down"), 2);
        assert_eq!(result.tally.total(), result.total_processed);
    }

    #[tokio::test]
    async fn test_pacing_applied_after_each_call() {
        let pacing = Duration::from_millis(20);
        let orchestrator = BatchOrchestrator::new(Arc::new(Unreachable)).with_pacing(pacing);
        let mut sink = Lines::default();

        let started = Instant::now();
        orchestrator
            .run_batch(&hosts(3), BatchAction::Start, &mut sink)
            .await;

        assert!(started.elapsed() >= pacing * 3);
    }

    #[test]
    fn test_default_pacing() {
        let orchestrator = BatchOrchestrator::new(Arc::new(Unreachable));
        assert_eq!(orchestrator.pacing, Duration::from_millis(100));
    }

    #[derive(Debug, thiserror::Error)]
    #[error("tcp connect error")]
    struct ConnectFailed(#[source] std::io::Error);

    #[test]
    fn test_error_chain_includes_causes() {
        let err = ConnectFailed(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "Connection refused",
        ));
        assert_eq!(error_chain(&err), "tcp connect error: Connection refused");

        // the source is already part of the top-level message
        let err = ClientError::InvalidResponse(DocumentError::Parse("unexpected end".into()));
        assert_eq!(
            error_chain(&err),
            "Invalid response: malformed XML: unexpected end"
        );
    }
}
