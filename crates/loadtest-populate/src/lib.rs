//! Common types and utilities for loadtest populators.
//!
//! This crate provides the shared argument types used by the
//! loadtest-populate-* crates, so every producer exposes the same batching,
//! parallelism and record-shape flags.

pub mod args;

pub use args::{CommonPopulateArgs, CorpusChoice};
