//! Create annotated semantic-version git tags from configurable templates.
//!
//! The next version is derived from the highest existing tag that matches the
//! tag name template, bumped by a major, minor or patch step. See
//! [`workflow::TagWorkflow`] for the full pipeline.

pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod hooks;
pub mod ui;
pub mod workflow;

pub use error::{AutotagError, Result};
