// User-visible load and runtime notices. Blocking notices render as a
// dismissible banner; toasts auto-dismiss. Neither ever halts the
// viewer.

use std::fmt;

/// A user-visible notice pushed through the panel sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The affected layer cannot be shown; requires user attention.
    Blocking { message: String },
    /// Degraded but usable; shown briefly and logged.
    Toast { message: String },
}

impl Notice {
    pub fn blocking(message: impl Into<String>) -> Self {
        Self::Blocking {
            message: message.into(),
        }
    }

    pub fn toast(message: impl Into<String>) -> Self {
        Self::Toast {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Blocking { message } | Self::Toast { message } => message,
        }
    }

    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Blocking { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocking { message } => write!(f, "error: {message}"),
            Self::Toast { message } => write!(f, "{message}"),
        }
    }
}
