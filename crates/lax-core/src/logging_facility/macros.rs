//! Canonical logging macros
//!
//! Every engine operation brackets its work with one start event and either
//! one end or one end_error event.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use lax_core::log_op_start;
/// log_op_start!("ingest");
/// log_op_start!("publish", msid = 1968_i64, version = 1_u32);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::lax_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::lax_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use lax_core::log_op_end;
/// log_op_end!("ingest", duration_ms = 42_u64);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::lax_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::lax_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// The error expression is converted into `ExError`, so both `LaxError` and
/// `ExError` values are accepted.
///
/// # Example
///
/// ```
/// # use lax_core::{log_op_error, errors::LaxError};
/// let err = LaxError::VersionNotFound { msid: 1968, version: 2 };
/// log_op_error!("publish", err, duration_ms = 10_u64);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::lax_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            err_rule = ex_err.rule().map(|r| r.as_str()).unwrap_or(""),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::lax_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            err_rule = ex_err.rule().map(|r| r.as_str()).unwrap_or(""),
            $($field)*
        );
    }};
}
