//! Error types for the execution engine

use std::fmt;

use thiserror::Error;

use crate::value::{ExoticObject, JsValue};

/// File name carried by frames of functions implemented in Rust.
///
/// Frames whose file name starts with this prefix are native frames: they are
/// never recorded into a [`ThrowTrace`], and they are the only frames kept from
/// an error's native diagnostic when a `catch` clause materializes its trace.
pub const NATIVE_FILE_NAME: &str = "[native code]";

/// Stack frame for error traces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackElement {
    pub file_name: String,
    pub line: u32,
    pub debug_context: String,
}

impl StackElement {
    pub fn new(file_name: impl Into<String>, line: u32, debug_context: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            line,
            debug_context: debug_context.into(),
        }
    }

    /// Frame for a function implemented in Rust
    pub fn native(debug_context: impl Into<String>) -> Self {
        Self::new(NATIVE_FILE_NAME, 0, debug_context)
    }

    pub fn is_native(&self) -> bool {
        self.file_name.starts_with(NATIVE_FILE_NAME)
    }
}

impl fmt::Display for StackElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_native() {
            write!(f, "    at {} (native)", self.debug_context)
        } else {
            write!(
                f,
                "    at {} ({}:{})",
                self.debug_context, self.file_name, self.line
            )
        }
    }
}

/// Script frames accumulated while an exception unwinds, innermost first.
///
/// Every context the exception leaves appends its own frame. The trace is
/// consumed once, by the first `catch` clause that observes the exception.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThrowTrace {
    frames: Vec<StackElement>,
}

impl ThrowTrace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the frame of a context the exception is leaving.
    pub fn record(&mut self, frame: StackElement) {
        if frame.is_native() {
            return;
        }
        log::trace!("recording throw frame {}", frame.debug_context);
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[StackElement] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn into_frames(self) -> Vec<StackElement> {
        self.frames
    }
}

/// Main error type for the engine
#[derive(Debug, Error)]
pub enum JsError {
    /// A script-visible exception in flight, with the frames it unwound through
    #[error("{}{}", describe_thrown(.value), format_stack(.trace.frames()))]
    Thrown { value: JsValue, trace: ThrowTrace },

    #[error("TypeError: {message}")]
    TypeError { message: String },

    #[error("ReferenceError: {message}")]
    ReferenceError { message: String },

    #[error("RangeError: {message}")]
    RangeError { message: String },

    #[error("SyntaxError: {message}")]
    SyntaxError { message: String },

    #[error("URIError: {message}")]
    UriError { message: String },

    /// Failure raised by host code while a native function was running
    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_stack(stack: &[StackElement]) -> String {
    stack.iter().map(|f| format!("\n{}", f)).collect()
}

fn describe_thrown(value: &JsValue) -> String {
    if let JsValue::Object(obj) = value {
        if let ExoticObject::Error(data) = &obj.borrow().exotic {
            return match &data.message {
                Some(message) if !message.is_empty() => format!("{}: {}", data.kind, message),
                _ => data.kind.to_string(),
            };
        }
    }
    format!("Uncaught {}", value.to_js_string())
}

impl JsError {
    /// Wrap a thrown value with an empty trace
    pub fn thrown(value: JsValue) -> Self {
        JsError::Thrown {
            value,
            trace: ThrowTrace::new(),
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        JsError::TypeError {
            message: message.into(),
        }
    }

    pub fn reference_error(name: impl fmt::Display) -> Self {
        JsError::ReferenceError {
            message: format!("{} is not defined", name),
        }
    }

    pub fn reference_error_with_message(message: impl Into<String>) -> Self {
        JsError::ReferenceError {
            message: message.into(),
        }
    }

    pub fn range_error(message: impl Into<String>) -> Self {
        JsError::RangeError {
            message: message.into(),
        }
    }

    pub fn syntax_error(message: impl Into<String>) -> Self {
        JsError::SyntaxError {
            message: message.into(),
        }
    }

    pub fn uri_error(message: impl Into<String>) -> Self {
        JsError::UriError {
            message: message.into(),
        }
    }

    /// Create an internal error for unexpected engine states
    pub fn internal_error(message: impl Into<String>) -> Self {
        JsError::Internal(message.into())
    }

    /// Name of the global constructor used when this error is materialized
    /// into a script error object. `None` for values already thrown.
    pub fn constructor_name(&self) -> Option<&'static str> {
        match self {
            JsError::Thrown { .. } => None,
            JsError::TypeError { .. } => Some("TypeError"),
            JsError::ReferenceError { .. } => Some("ReferenceError"),
            JsError::RangeError { .. } => Some("RangeError"),
            JsError::SyntaxError { .. } => Some("SyntaxError"),
            JsError::UriError { .. } => Some("URIError"),
            JsError::Internal(_) => Some("Error"),
        }
    }

    /// Message text of a native error
    pub fn message(&self) -> Option<&str> {
        match self {
            JsError::Thrown { .. } => None,
            JsError::TypeError { message }
            | JsError::ReferenceError { message }
            | JsError::RangeError { message }
            | JsError::SyntaxError { message }
            | JsError::UriError { message }
            | JsError::Internal(message) => Some(message),
        }
    }

    pub fn is_thrown(&self) -> bool {
        matches!(self, JsError::Thrown { .. })
    }

    /// The thrown value, if this error carries one
    pub fn thrown_value(&self) -> Option<&JsValue> {
        match self {
            JsError::Thrown { value, .. } => Some(value),
            _ => None,
        }
    }

    /// The frames recorded so far, if this error carries a thrown value
    pub fn trace(&self) -> Option<&ThrowTrace> {
        match self {
            JsError::Thrown { trace, .. } => Some(trace),
            _ => None,
        }
    }

    /// Append a frame to the trace of a thrown value. Native errors are left
    /// alone; they get their frames once they are materialized.
    pub fn record(mut self, frame: StackElement) -> Self {
        if let JsError::Thrown { trace, .. } = &mut self {
            trace.record(frame);
        }
        self
    }
}
