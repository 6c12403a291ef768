use recdiff_core_types::{RunId, TraceId};
use thiserror::Error;

/// Result type alias using the canonical ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers can match on, log,
/// or surface in a CLI exit message without parsing the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Configuration
    /// A delta rule expression does not parse
    InvalidDelta,
    /// A differ configuration is inconsistent (empty key field, repeated fields)
    InvalidConfig,

    // Integrity
    /// The same key was seen twice in one source while duplicates are disallowed
    DuplicateKey,
    /// A field declared numeric held a value that cannot be coerced to a float
    NotANumber,

    // Structural (normally reported as an aborted outcome, not raised)
    MissingKeyField,
    PropertiesUnavailable,

    // Sources
    /// The record source could not produce records (bad file, bad query)
    Source,
    /// A selection criterion was rejected by the source that received it
    InvalidSelection,

    // Integration/IO
    Io,
    /// Diff output could not be rendered as JSON
    Serialization,
    Persistence,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidDelta => "ERR_INVALID_DELTA",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::DuplicateKey => "ERR_DUPLICATE_KEY",
            ExErrorKind::NotANumber => "ERR_NOT_A_NUMBER",
            ExErrorKind::MissingKeyField => "ERR_MISSING_KEY_FIELD",
            ExErrorKind::PropertiesUnavailable => "ERR_PROPERTIES_UNAVAILABLE",
            ExErrorKind::Source => "ERR_SOURCE",
            ExErrorKind::InvalidSelection => "ERR_INVALID_SELECTION",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
        }
    }

    /// True for data contract violations that must never be tolerated
    pub fn is_integrity(&self) -> bool {
        matches!(self, ExErrorKind::DuplicateKey | ExErrorKind::NotANumber)
    }
}

/// Canonical structured error type
///
/// Carries a classification kind plus optional diff context (operation,
/// source name, record key, property) for programmatic handling.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    source_name: Option<String>,
    key: Option<String>,
    property: Option<String>,
    run_id: Option<RunId>,
    trace_id: Option<TraceId>,
    message: String,
    cause: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            source_name: None,
            key: None,
            property: None,
            run_id: None,
            trace_id: None,
            message: String::new(),
            cause: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the name of the record source involved
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = Some(name.into());
        self
    }

    /// Add record key context (rendered form)
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Add property name context
    pub fn with_property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    /// Add run ID context
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add trace ID context
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add the underlying error
    pub fn with_cause(mut self, cause: ExError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the source name, if any
    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// Get the record key, if any
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Get the property name, if any
    pub fn property(&self) -> Option<&str> {
        self.property.as_deref()
    }

    /// Get the run ID context, if any
    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    /// Get the trace ID context, if any
    pub fn trace_id(&self) -> Option<&TraceId> {
        self.trace_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the underlying error, if any
    pub fn cause(&self) -> Option<&ExError> {
        self.cause.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(source_name) = &self.source_name {
            write!(f, " (source: {})", source_name)?;
        }
        if let Some(key) = &self.key {
            write!(f, " (key: {})", key)?;
        }
        if let Some(property) = &self.property {
            write!(f, " (property: {})", property)?;
        }
        if let Some(cause) = &self.cause {
            write!(f, " <- {}", cause)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause
            .as_deref()
            .map(|c| c as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for delta parsing, configuration and extraction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiffError {
    // ===== Delta syntax =====
    /// Expression does not start with a recognisable `+X-Y` form
    #[error("Bad syntax for delta '{expr}'")]
    BadDeltaSyntax { expr: String },

    /// Expression parsed but left unparsed characters behind
    #[error("Junk at end of delta '{expr}': {junk}")]
    DeltaTrailingJunk { expr: String, junk: String },

    /// `+X-` with no lower magnitude
    #[error("Bad syntax for delta '{expr}': +X-")]
    AsymmetricDelta { expr: String },

    // ===== Configuration =====
    /// Configuration rejected before any extraction ran
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // ===== Integrity =====
    /// Same key twice in one source with duplicates disallowed
    #[error("Duplicate key: {key} (source: {source_name})")]
    DuplicateKey { source_name: String, key: String },

    /// Declared-numeric field could not be coerced
    #[error("Not a number: source={source_name} key={key} {property}='{value}'")]
    NotANumber {
        source_name: String,
        key: String,
        property: String,
        value: String,
    },
}

/// Conversion from DiffError to the canonical ExError
impl From<DiffError> for ExError {
    fn from(err: DiffError) -> Self {
        let message = err.to_string();
        match err {
            DiffError::BadDeltaSyntax { .. }
            | DiffError::DeltaTrailingJunk { .. }
            | DiffError::AsymmetricDelta { .. } => ExError::new(ExErrorKind::InvalidDelta)
                .with_op("parse_delta")
                .with_message(message),

            DiffError::InvalidConfig { .. } => ExError::new(ExErrorKind::InvalidConfig)
                .with_op("validate_config")
                .with_message(message),

            DiffError::DuplicateKey { source_name, key } => {
                ExError::new(ExErrorKind::DuplicateKey)
                    .with_op("extract")
                    .with_source_name(source_name)
                    .with_key(key)
                    .with_message(message)
            }

            DiffError::NotANumber {
                source_name,
                key,
                property,
                ..
            } => ExError::new(ExErrorKind::NotANumber)
                .with_op("extract")
                .with_source_name(source_name)
                .with_key(key)
                .with_property(property)
                .with_message(message),
        }
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::new(ExErrorKind::Serialization)
            .with_op("render")
            .with_message(err.to_string())
    }
}
