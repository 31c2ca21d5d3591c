//! # TimeBlock
//!
//! A personal task timer with scheduled breaks, long-pause and overtime
//! nags, and recorded history.
//!
//! The centre of the crate is the timer core in [`libs::timer`]: one
//! locally persisted session that knows whether the user is working, paused
//! or on a break, reconciles itself with the time logs in the store, and
//! derives its prompts from wall-clock deadlines.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use timeblock::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
