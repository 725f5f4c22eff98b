//! Scripted backend used by the use-case tests.

use crate::ports::backend_gateway::{BackendGateway, Completion, CompletionRequest, GatewayError};
use async_trait::async_trait;
use roundtable_domain::{Model, TokenUsage};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Replies `"<model> reply #<n>"`, with optional per-model delays and faults.
#[derive(Default)]
pub struct MockGateway {
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    panicking: HashSet<String>,
    empty: HashSet<String>,
    usage: Option<TokenUsage>,
    fail_all: AtomicBool,
    calls: Mutex<Vec<CompletionRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, model: &str, millis: u64) -> Self {
        self.delays
            .insert(model.to_string(), Duration::from_millis(millis));
        self
    }

    pub fn failing(mut self, model: &str) -> Self {
        self.failing.insert(model.to_string());
        self
    }

    pub fn panicking(mut self, model: &str) -> Self {
        self.panicking.insert(model.to_string());
        self
    }

    pub fn empty_reply(mut self, model: &str) -> Self {
        self.empty.insert(model.to_string());
        self
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn set_fail_all(&self, fail: bool) {
        self.fail_all.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, model: &str) -> Vec<CompletionRequest> {
        self.calls()
            .into_iter()
            .filter(|c| c.model.as_str() == model)
            .collect()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BackendGateway for MockGateway {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, GatewayError> {
        let model = request.model.as_str().to_string();
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(request);
            calls.iter().filter(|c| c.model.as_str() == model).count()
        };

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&model) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panicking.contains(&model) {
            panic!("scripted panic for {model}");
        }
        if self.fail_all.load(Ordering::SeqCst) || self.failing.contains(&model) {
            return Err(GatewayError::RequestFailed(format!("{model} is down")));
        }
        if self.empty.contains(&model) {
            return Ok(Completion::new("   "));
        }

        let completion = Completion::new(format!("{model} reply #{attempt}"));
        Ok(match self.usage {
            Some(usage) => completion.with_usage(usage),
            None => completion,
        })
    }

    async fn available_models(&self) -> Result<Vec<Model>, GatewayError> {
        Ok(Vec::new())
    }
}
