//! Database layer for timeblock.
//!
//! A single SQLite file holds tasks, time logs, break logs and per-user break
//! settings. Repositories borrow a migrated connection; [`store::SqliteStore`]
//! wraps them behind the async session-store contract used by the timer.
//!
//! ## Usage
//!
//! ```rust
//! use timeblock::db::store::SqliteStore;
//! use timeblock::libs::task::{Task, TaskFilter};
//!
//! let store = SqliteStore::in_memory()?;
//! store.add_task(&Task::new("me", "Write report", 1800))?;
//! assert_eq!(store.tasks("me", TaskFilter::Open)?.len(), 1);
//! # Ok::<(), anyhow::Error>(())
//! ```

/// Connection setup; every connection is migrated before use.
pub mod db;

/// Versioned schema migrations.
pub mod migrations;

/// Tasks and their estimates.
pub mod tasks;

/// Open and closed time logs.
pub mod time_logs;

pub mod break_logs;

pub mod break_settings;

/// The [`crate::libs::remote::SessionStore`] implementation over SQLite.
pub mod store;
