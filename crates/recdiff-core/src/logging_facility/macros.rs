//! Canonical operation logging macros
//!
//! Every event carries `component`, `op` and `event` so log consumers can
//! pair starts with ends without parsing messages. Extra `name = value`
//! fields follow the usual `tracing` field syntax (`%x`, `?x` included).

#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:ident, $op:expr, $event:ident $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::$event,
            $($($field)*)?
        )
    };
}

/// Log the start of an operation
///
/// ```
/// # use recdiff_core::log_op_start;
/// log_op_start!("load_config");
/// log_op_start!("load_config", path = "diff.yaml");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(info, $op, EVENT_START $(, $($field)*)?)
    };
}

/// Log the successful end of an operation; `duration_ms` comes first
///
/// ```
/// # use recdiff_core::log_op_end;
/// log_op_end!("load_config", duration_ms = 42);
/// log_op_end!("diff", duration_ms = 7, missing = 3u64);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            info, $op, EVENT_END,
            duration_ms = $duration $(, $($field)*)?
        )
    };
}

/// Log a failed operation with the error's kind and stable code
///
/// The error may be anything convertible into `ExError`.
///
/// ```
/// # use recdiff_core::{log_op_error, errors::DiffError};
/// let err = DiffError::BadDeltaSyntax { expr: "5".to_string() };
/// log_op_error!("load_config", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        $crate::__log_op_event!(
            error, $op, EVENT_END_ERROR,
            duration_ms = $duration,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code()
            $(, $($field)*)?
        )
    }};
}
