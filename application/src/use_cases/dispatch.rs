//! Dispatch pool
//!
//! Runs one backend call per participant concurrently, bounded by a
//! semaphore, and hands the results back in participant order. Failures of
//! any kind stay inside the participant's outcome.

use crate::ports::backend_gateway::{BackendGateway, Completion, CompletionRequest, GatewayError};
use crate::ports::progress::ProgressNotifier;
use roundtable_domain::{ChatMessage, Model, Roster};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Result of one participant's call
#[derive(Debug, Clone)]
pub struct DispatchOutcome {
    pub model: Model,
    /// Temperature drawn for this call
    pub temperature: f64,
    pub result: Result<Completion, GatewayError>,
    pub elapsed: Duration,
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Bounded concurrent fan-out over a [`BackendGateway`]
pub struct DispatchPool<G: BackendGateway + ?Sized + 'static> {
    gateway: Arc<G>,
    max_workers: usize,
    request_timeout: Option<Duration>,
    response_tokens: u32,
}

impl<G: BackendGateway + ?Sized + 'static> DispatchPool<G> {
    pub fn new(gateway: Arc<G>, max_workers: usize, response_tokens: u32) -> Self {
        Self {
            gateway,
            max_workers: max_workers.max(1),
            request_timeout: None,
            response_tokens,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Send `requests[i]` to participant `i` of `roster`.
    ///
    /// Returns one outcome per participant, in roster order, after every call
    /// has finished. `requests` must hold exactly one entry per participant.
    pub async fn dispatch(
        &self,
        roster: &Roster,
        requests: Vec<Vec<ChatMessage>>,
        progress: &dyn ProgressNotifier,
    ) -> Vec<DispatchOutcome> {
        debug_assert_eq!(roster.len(), requests.len());

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut join_set = JoinSet::new();

        for (index, (participant, messages)) in roster.iter().zip(requests).enumerate() {
            let gateway = Arc::clone(&self.gateway);
            let semaphore = Arc::clone(&semaphore);
            let timeout = self.request_timeout;
            let temperature = participant.sampling().at(rand::random::<f64>());
            let request = CompletionRequest {
                model: participant.model().clone(),
                messages,
                temperature,
                max_tokens: self.response_tokens,
            };

            join_set.spawn(async move {
                let model = request.model.clone();
                let started = Instant::now();
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => Self::call(gateway.as_ref(), request, timeout).await,
                    Err(e) => Err(GatewayError::Other(e.to_string())),
                };
                (
                    index,
                    DispatchOutcome {
                        model,
                        temperature,
                        result,
                        elapsed: started.elapsed(),
                    },
                )
            });
        }

        let mut slots: Vec<Option<DispatchOutcome>> = vec![None; roster.len()];

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    match &outcome.result {
                        Ok(_) => debug!(
                            "{} replied in {:.1}s (temperature {:.2})",
                            outcome.model,
                            outcome.elapsed.as_secs_f64(),
                            outcome.temperature
                        ),
                        Err(e) => warn!("{} failed: {}", outcome.model, e),
                    }
                    progress.on_participant_complete(&outcome.model, outcome.is_success());
                    slots[index] = Some(outcome);
                }
                Err(e) => {
                    warn!("Dispatch task aborted: {}", e);
                }
            }
        }

        // A slot left empty means its task panicked or was cancelled
        slots
            .into_iter()
            .zip(roster.iter())
            .map(|(slot, participant)| {
                slot.unwrap_or_else(|| {
                    progress.on_participant_complete(participant.model(), false);
                    DispatchOutcome {
                        model: participant.model().clone(),
                        temperature: 0.0,
                        result: Err(GatewayError::Other("task panicked".to_string())),
                        elapsed: Duration::ZERO,
                    }
                })
            })
            .collect()
    }

    async fn call(
        gateway: &G,
        request: CompletionRequest,
        timeout: Option<Duration>,
    ) -> Result<Completion, GatewayError> {
        let completion = match timeout {
            Some(limit) => tokio::time::timeout(limit, gateway.complete(request))
                .await
                .unwrap_or(Err(GatewayError::Timeout)),
            None => gateway.complete(request).await,
        }?;

        if completion.content.trim().is_empty() {
            return Err(GatewayError::MalformedResponse(
                "empty completion".to_string(),
            ));
        }
        Ok(completion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::progress::NoProgress;
    use crate::testing::MockGateway;
    use roundtable_domain::{SamplingRange, TokenUsage};
    use std::sync::Mutex;

    fn roster(ids: &[&str]) -> Roster {
        let models = ids.iter().map(|id| Model::try_new(id).unwrap());
        Roster::from_models(models, SamplingRange::new(0.2, 0.9).unwrap()).unwrap()
    }

    fn requests(n: usize) -> Vec<Vec<ChatMessage>> {
        (0..n).map(|i| vec![ChatMessage::user(format!("prompt {i}"))]).collect()
    }

    fn names(outcomes: &[DispatchOutcome]) -> Vec<&str> {
        outcomes.iter().map(|o| o.model.as_str()).collect()
    }

    #[derive(Default)]
    struct RecordingProgress {
        completed: Mutex<Vec<(String, bool)>>,
    }

    impl ProgressNotifier for RecordingProgress {
        fn on_round_start(&self, _: roundtable_domain::RoundKind, _: u32, _: u32, _: usize) {}
        fn on_participant_complete(&self, model: &Model, success: bool) {
            self.completed
                .lock()
                .unwrap()
                .push((model.to_string(), success));
        }
        fn on_round_complete(&self, _: roundtable_domain::RoundKind, _: u32) {}
    }

    #[tokio::test]
    async fn test_results_follow_participant_order_not_completion_order() {
        let gateway = Arc::new(
            MockGateway::new()
                .with_delay("slow", 120)
                .with_delay("medium", 60)
                .with_delay("fast", 0),
        );
        let pool = DispatchPool::new(gateway, 5, 256);
        let progress = RecordingProgress::default();

        let outcomes = pool
            .dispatch(&roster(&["slow", "medium", "fast"]), requests(3), &progress)
            .await;

        assert_eq!(names(&outcomes), vec!["slow", "medium", "fast"]);
        assert!(outcomes.iter().all(DispatchOutcome::is_success));
        let completion_order: Vec<_> = progress
            .completed
            .lock()
            .unwrap()
            .iter()
            .map(|(m, _)| m.clone())
            .collect();
        assert_eq!(completion_order, vec!["fast", "medium", "slow"]);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded_by_max_workers() {
        let mut gateway = MockGateway::new();
        for id in ["a", "b", "c", "d", "e"] {
            gateway = gateway.with_delay(id, 30);
        }
        let gateway = Arc::new(gateway);
        let pool = DispatchPool::new(Arc::clone(&gateway), 2, 256);

        let outcomes = pool
            .dispatch(&roster(&["a", "b", "c", "d", "e"]), requests(5), &NoProgress)
            .await;

        assert_eq!(outcomes.len(), 5);
        assert_eq!(gateway.max_in_flight(), 2);
    }

    #[tokio::test]
    async fn test_calls_run_in_parallel_up_to_the_roster() {
        let mut gateway = MockGateway::new();
        for id in ["a", "b", "c", "d", "e"] {
            gateway = gateway.with_delay(id, 30);
        }
        let gateway = Arc::new(gateway);
        let pool = DispatchPool::new(Arc::clone(&gateway), 8, 256);

        let started = Instant::now();
        let outcomes = pool
            .dispatch(&roster(&["a", "b", "c", "d", "e"]), requests(5), &NoProgress)
            .await;

        assert!(outcomes.iter().all(DispatchOutcome::is_success));
        assert_eq!(gateway.max_in_flight(), 5);
        assert!(started.elapsed() < Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_failures_stay_per_participant() {
        let gateway = Arc::new(MockGateway::new().failing("b").empty_reply("c"));
        let pool = DispatchPool::new(gateway, 3, 256);

        let outcomes = pool
            .dispatch(&roster(&["a", "b", "c"]), requests(3), &NoProgress)
            .await;

        assert!(outcomes[0].is_success());
        assert!(matches!(outcomes[1].result, Err(GatewayError::RequestFailed(_))));
        assert!(matches!(outcomes[2].result, Err(GatewayError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_timeout_only_affects_slow_participant() {
        let gateway = Arc::new(MockGateway::new().with_delay("stuck", 2_000));
        let pool = DispatchPool::new(gateway, 3, 256)
            .with_request_timeout(Some(Duration::from_millis(50)));

        let outcomes = pool
            .dispatch(&roster(&["ok", "stuck"]), requests(2), &NoProgress)
            .await;

        assert!(outcomes[0].is_success());
        assert_eq!(outcomes[1].result, Err(GatewayError::Timeout));
    }

    #[tokio::test]
    async fn test_panicking_task_becomes_failure() {
        let gateway = Arc::new(MockGateway::new().panicking("boom"));
        let pool = DispatchPool::new(gateway, 2, 256);
        let progress = RecordingProgress::default();

        let outcomes = pool
            .dispatch(&roster(&["boom", "fine"]), requests(2), &progress)
            .await;

        assert_eq!(names(&outcomes), vec!["boom", "fine"]);
        assert!(!outcomes[0].is_success());
        assert!(outcomes[1].is_success());
        assert_eq!(progress.completed.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_request_carries_sampled_temperature_and_cap() {
        let gateway = Arc::new(MockGateway::new().with_usage(TokenUsage::new(10, 5)));
        let pool = DispatchPool::new(Arc::clone(&gateway), 2, 321);

        let outcomes = pool
            .dispatch(&roster(&["a", "b"]), requests(2), &NoProgress)
            .await;

        for call in gateway.calls() {
            assert_eq!(call.max_tokens, 321);
            assert!((0.2..=0.9).contains(&call.temperature));
        }
        let first = gateway.calls_for("a");
        assert_eq!(first[0].messages[0].content, "prompt 0");
        assert_eq!(
            outcomes[0].result.as_ref().unwrap().usage,
            Some(TokenUsage::new(10, 5))
        );
    }
}
