//! Ports layer: Trait definitions for external collaborators.
//!
//! Following Hexagonal Architecture, the classifier is reached only through
//! the trait defined here, so tests can substitute a stub.

mod classifier;

pub use classifier::Classifier;
