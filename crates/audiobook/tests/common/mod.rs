//! Shared test utilities for audiobook integration tests.
//!
//! This module provides:
//! - `TestHarness` for running a real controller inside temp directories
//! - Builders for fixture PDFs and configurations

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::*;
