//! Core library modules for timeblock.
//!
//! - **Timer**: session state machine, readout, prompts, alerts, the timer
//!   core and its runtime service
//! - **Store contract**: the async store trait and its row types
//! - **Infrastructure**: configuration, data directory, local session
//!   storage, clock, messages and console rendering

pub mod alert;
pub mod clock;
pub mod config;
pub mod data_storage;
pub mod formatter;
pub mod messages;
pub mod prompts;
pub mod readout;
pub mod remote;
pub mod service;
pub mod session;
pub mod storage;
pub mod task;
pub mod timer;
pub mod view;
