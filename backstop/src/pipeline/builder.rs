//! Pipeline construction with configuration validation.

use super::Pipeline;
use crate::breaker::{BreakerConfig, CircuitBreaker};
use crate::errors::ConfigError;
use crate::events::{EventSink, NoOpEventSink};
use crate::retry::RetryPolicy;
use crate::timeout::TimeoutPolicy;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Builder for [`Pipeline`].
///
/// All configuration is validated in [`build`](Self::build); a pipeline that
/// constructs successfully never raises configuration errors at call time.
#[derive(Default)]
pub struct PipelineBuilder {
    retry: RetryPolicy,
    timeout: TimeoutPolicy,
    breaker_config: BreakerConfig,
    breaker: Option<Arc<CircuitBreaker>>,
    sink: Option<Arc<dyn EventSink>>,
    jitter_seed: Option<u64>,
}

impl PipelineBuilder {
    /// Creates a builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retry policy.
    #[must_use]
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Sets the per-attempt timeout policy.
    #[must_use]
    pub fn timeout(mut self, policy: TimeoutPolicy) -> Self {
        self.timeout = policy;
        self
    }

    /// Sets the configuration for a breaker owned by this pipeline.
    ///
    /// Ignored when [`shared_breaker`](Self::shared_breaker) is used.
    #[must_use]
    pub fn breaker_config(mut self, config: BreakerConfig) -> Self {
        self.breaker_config = config;
        self
    }

    /// Binds an existing breaker so several pipelines share one target's
    /// failure state.
    #[must_use]
    pub fn shared_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.breaker = Some(breaker);
        self
    }

    /// Sets the sink that receives attempt records and breaker transitions.
    #[must_use]
    pub fn event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Seeds the jitter source, making backoff delays reproducible.
    #[must_use]
    pub fn jitter_seed(mut self, seed: u64) -> Self {
        self.jitter_seed = Some(seed);
        self
    }

    /// Validates the configuration and builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first invalid option.
    pub fn build(self) -> Result<Pipeline, ConfigError> {
        self.retry.validate()?;
        self.timeout.validate()?;

        let breaker = match self.breaker {
            Some(breaker) => breaker,
            None => Arc::new(CircuitBreaker::new(self.breaker_config)?),
        };
        let rng = match self.jitter_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Pipeline {
            retry: self.retry,
            timeout: self.timeout,
            breaker,
            sink: self.sink.unwrap_or_else(|| Arc::new(NoOpEventSink)),
            rng: Mutex::new(rng),
        })
    }
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .field("breaker_config", &self.breaker_config)
            .field("shared_breaker", &self.breaker.is_some())
            .field("jitter_seed", &self.jitter_seed)
            .finish()
    }
}
