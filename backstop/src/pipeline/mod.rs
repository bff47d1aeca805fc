//! Pipeline composition and execution.
//!
//! This module provides:
//! - the builder with construction-time configuration validation
//! - the execute loop composing the breaker gate, the per-attempt timeout,
//!   outcome classification, breaker feedback, and the retry decision

mod builder;
mod executor;


pub use builder::PipelineBuilder;
pub use executor::Pipeline;
