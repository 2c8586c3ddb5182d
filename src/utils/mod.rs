//! Shared utilities for the layer implementations
//!
//! This module provides weight initialisation and activation functions used
//! across layers.

pub mod activations;
pub mod init;

pub use activations::Activation;
pub use init::Initializer;
