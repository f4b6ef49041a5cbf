//! Command Line Interface (CLI) layer for landsuit.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) that turns flags or a JSON config
//! into a project run backed by the GDAL disk store.
//!
//! If you are embedding landsuit into another application, prefer using
//! the high-level `landsuit::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
