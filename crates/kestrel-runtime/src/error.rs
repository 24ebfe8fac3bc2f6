use kestrel_ast::span::Span;
use kestrel_parse::FrontendError;
use thiserror::Error;

/// One active call: the callee's name and where it was called from.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub name: String,
    pub call_site: Span,
}

/// Error raised while evaluating a program.
///
/// The span and stack trace are filled in on the way up by the innermost
/// node that sees the error; outer nodes leave them alone.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct RuntimeError {
    pub message: String,
    pub span: Option<Span>,
    pub stack_trace: Option<Vec<Frame>>,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            span: None,
            stack_trace: None,
        }
    }

    /// Attach a location and a trace snapshot unless already present.
    pub fn located(mut self, span: impl FnOnce() -> Span, trace: &[Frame]) -> Self {
        if self.span.is_none() {
            self.span = Some(span());
        }
        self.with_trace(trace)
    }

    pub fn with_trace(mut self, trace: &[Frame]) -> Self {
        if self.stack_trace.is_none() {
            self.stack_trace = Some(trace.to_vec());
        }
        self
    }
}

impl From<FrontendError> for RuntimeError {
    fn from(e: FrontendError) -> Self {
        Self {
            message: e.to_string(),
            span: Some(e.span()),
            stack_trace: None,
        }
    }
}

/// `return Err(RuntimeError::new(format!(...)))`
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::error::RuntimeError::new(format!($($arg)*)))
    };
}

pub(crate) use bail;
