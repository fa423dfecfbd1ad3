//! Application layer: Use cases.
//!
//! Orchestrates the domain form with the classifier port.

mod pipeline;

pub use pipeline::InferencePipeline;
