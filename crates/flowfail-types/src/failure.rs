use std::{
    backtrace::{Backtrace, BacktraceStatus},
    error::Error,
    fmt,
};

use crate::{ArgumentError, Data, FailureOptions};

/// Boxed cause carried by a [`StructuredFailure`].
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// A failure carrying a message, a mandatory [`Data`] payload and an optional
/// cause.
///
/// Message, data and cause are fixed at construction; there is no way to
/// change them afterwards. `Display` renders `Fail: <message> <data>`.
pub struct StructuredFailure {
    message: String,
    data: Data,
    cause: Option<BoxError>,
    options: FailureOptions,
    backtrace: Backtrace,
    suppressed: Vec<BoxError>,
}

impl StructuredFailure {
    pub fn new(message: impl Into<String>, data: Data) -> Self {
        Self::with_options(message, data, None, FailureOptions::default())
    }

    pub fn with_cause(message: impl Into<String>, data: Data, cause: impl Into<BoxError>) -> Self {
        Self::with_options(message, data, Some(cause.into()), FailureOptions::default())
    }

    /// Full constructor. A stack trace is captured here, once, when
    /// `options.capture_trace` is set, regardless of `RUST_BACKTRACE`.
    pub fn with_options(
        message: impl Into<String>,
        data: Data,
        cause: Option<BoxError>,
        options: FailureOptions,
    ) -> Self {
        let backtrace = if options.capture_trace {
            Backtrace::force_capture()
        } else {
            Backtrace::disabled()
        };
        Self {
            message: message.into(),
            data,
            cause,
            options,
            backtrace,
            suppressed: Vec::new(),
        }
    }

    /// Fallible constructor for call sites whose payload may be absent.
    ///
    /// A missing payload is a bug in the raising code and yields
    /// [`ArgumentError::MissingData`] instead of a failure value.
    pub fn try_new(
        message: impl Into<String>,
        data: Option<Data>,
        cause: Option<BoxError>,
    ) -> Result<Self, ArgumentError> {
        Self::try_with_options(message, data, cause, FailureOptions::default())
    }

    pub fn try_with_options(
        message: impl Into<String>,
        data: Option<Data>,
        cause: Option<BoxError>,
        options: FailureOptions,
    ) -> Result<Self, ArgumentError> {
        let data = data.ok_or(ArgumentError::MissingData)?;
        Ok(Self::with_options(message, data, cause, options))
    }

    /// Builds a failure from an arbitrary JSON payload, which must be an object.
    pub fn try_from_json(
        message: impl Into<String>,
        data: serde_json::Value,
        cause: Option<BoxError>,
    ) -> Result<Self, ArgumentError> {
        let data = Data::try_from(data)?;
        Ok(Self::with_options(message, data, cause, FailureOptions::default()))
    }

    /// Records a secondary failure raised while this one was being handled,
    /// such as a cleanup step that also failed.
    ///
    /// Dropped when suppression is disabled.
    pub fn suppress(mut self, err: impl Into<BoxError>) -> Self {
        if self.options.enable_suppression {
            self.suppressed.push(err.into());
        }
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> &Data {
        &self.data
    }

    pub fn cause(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    pub fn options(&self) -> FailureOptions {
        self.options
    }

    pub fn suppression_enabled(&self) -> bool {
        self.options.enable_suppression
    }

    pub fn stack_capture_enabled(&self) -> bool {
        self.options.capture_trace
    }

    /// The trace taken at construction, if one was actually captured.
    pub fn backtrace(&self) -> Option<&Backtrace> {
        match self.backtrace.status() {
            BacktraceStatus::Captured => Some(&self.backtrace),
            _ => None,
        }
    }

    pub fn suppressed(&self) -> &[BoxError] {
        &self.suppressed
    }

    pub fn is_root_cause(&self) -> bool {
        self.cause.is_none()
    }
}

impl fmt::Display for StructuredFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fail: {} {}", self.message, self.data)?;
        if f.alternate() {
            let mut source = self.source();
            while let Some(err) = source {
                write!(f, "\ncaused by: {err}")?;
                source = err.source();
            }
        }
        Ok(())
    }
}

impl fmt::Debug for StructuredFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("StructuredFailure");
        debug
            .field("message", &self.message)
            .field("data", &self.data)
            .field("cause", &self.cause);
        if !self.suppressed.is_empty() {
            debug.field("suppressed", &self.suppressed);
        }
        if let Some(backtrace) = self.backtrace() {
            debug.field("backtrace", backtrace);
        }
        debug.finish()
    }
}

impl Error for StructuredFailure {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn Error + 'static))
    }
}
