//! Command orchestration layer.
//!
//! ## Logging Ownership
//!
//! Public commands own lifecycle logging (`log_op_start!`, `log_op_end!`,
//! `log_op_error!`). The `*_in_tx` helpers they share log only at debug
//! level, so a combined command emits one start/end pair.

pub mod engine_command;
pub mod fragments;
pub mod ingest;
pub mod ingest_publish;
pub mod publish;
pub mod queries;
