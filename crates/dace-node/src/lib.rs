//! # dace-node — Evaluator service: locking, RocksDB storage, configuration.
//!
//! Composes the `dace-core` state machine into a shareable service:
//! - [`evaluator::Evaluator`] — serialises every transition behind one lock
//!   and persists each change before applying it
//! - [`storage::RocksStore`] — durable state backed by RocksDB
//! - [`config::EvaluatorConfig`] — service configuration
//! - [`logging::init_logging`] — tracing subscriber setup for hosts

pub mod config;
pub mod error;
pub mod evaluator;
pub mod logging;
pub mod storage;

pub use config::EvaluatorConfig;
pub use error::NodeError;
pub use evaluator::Evaluator;
pub use storage::RocksStore;
