//! lm-core: Scoring, session state and terminal frontend for lovematch.
//!
//! Exposed as a library for integration testing; the `lovematch` binary is
//! a thin wrapper around [`session::Session`] and [`repl::run_interactive`].

pub mod config;
pub mod render;
pub mod repl;
pub mod scoring;
pub mod session;
pub mod share;
pub mod style;
