//! Service layer for the rating run
//!
//! This module contains the application state that loads the history,
//! synchronises new events and runs the rating engine.

pub mod app;

pub use app::{AppState, RunSummary};
