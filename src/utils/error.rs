use thiserror::Error;

/// Why a booking state transition was refused.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransitionError {
    #[error("cannot cancel booking #{booking_id}: trek is in {days_left} days, minimum is {minimum}")]
    CancelWindow {
        booking_id: u32,
        days_left: i64,
        minimum: i64,
    },

    #[error("cannot modify booking #{booking_id}: trek is in {days_left} days, minimum is {minimum}")]
    ModifyWindow {
        booking_id: u32,
        days_left: i64,
        minimum: i64,
    },

    #[error("cannot {action} booking #{booking_id}: status is {status}")]
    InvalidStatus {
        booking_id: u32,
        action: &'static str,
        status: String,
    },

    #[error("cannot complete booking #{booking_id}: trek date {trek_date} has not passed")]
    NotYetTrekked { booking_id: u32, trek_date: String },
}

#[derive(Error, Debug)]
pub enum TrekError {
    #[error("Validation error on '{field}': {reason}")]
    Validation { field: String, reason: String },

    #[error("{0}")]
    Transition(#[from] TransitionError),

    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("Capacity exceeded: {reason}")]
    Capacity { reason: String },

    #[error("{kind} already exists: {key}")]
    Duplicate { kind: &'static str, key: String },

    #[error("Invalid username or password")]
    Authentication,

    #[error("Malformed record in {file} at line {line}: {reason}")]
    Parse {
        file: String,
        line: usize,
        reason: String,
    },

    #[error("Booking #{booking_id} references unknown attraction '{attraction}'")]
    DanglingReference { booking_id: u32, attraction: String },

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Rule,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TrekError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    pub fn capacity(reason: impl Into<String>) -> Self {
        Self::Capacity {
            reason: reason.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } | Self::Authentication | Self::NotFound { .. } => {
                ErrorCategory::Input
            }
            Self::Transition(_) | Self::Capacity { .. } | Self::Duplicate { .. } => {
                ErrorCategory::Rule
            }
            Self::Parse { .. } | Self::DanglingReference { .. } => ErrorCategory::Data,
            Self::Io(_) | Self::Config { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Rule => ErrorSeverity::Medium,
            ErrorCategory::Data => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::Io(e) => format!("Could not read or write the data files: {}", e),
            Self::Parse { file, line, .. } => {
                format!("The data file {} is damaged near line {}", file, line)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "Check the highlighted field and try again",
            Self::Transition(TransitionError::CancelWindow { .. }) => {
                "Cancellation closes shortly before the trek; ask an admin to override the status"
            }
            Self::Transition(TransitionError::ModifyWindow { .. }) => {
                "Changes close shortly before the trek; keep the booking or cancel it earlier next time"
            }
            Self::Transition(_) => "Check the booking status before retrying",
            Self::NotFound { .. } => "Verify the name or id and try again",
            Self::Capacity { .. } => "Pick another date, attraction or guide",
            Self::Duplicate { .. } => "Choose a different name",
            Self::Authentication => "Check your username and password",
            Self::Parse { .. } | Self::DanglingReference { .. } => {
                "Fix the record by hand, or set store.on_malformed = \"skip\" to drop it"
            }
            Self::Io(_) => "Check that the data directory exists and is writable",
            Self::Config { .. } => "Check the configuration file",
        }
    }
}

pub type Result<T> = std::result::Result<T, TrekError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_message_is_precise() {
        let err = TrekError::from(TransitionError::CancelWindow {
            booking_id: 4,
            days_left: 5,
            minimum: 7,
        });
        assert_eq!(
            err.to_string(),
            "cannot cancel booking #4: trek is in 5 days, minimum is 7"
        );
        assert_eq!(err.category(), ErrorCategory::Rule);
    }

    #[test]
    fn test_io_errors_are_critical() {
        let err = TrekError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only",
        ));
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("read-only"));
    }
}
