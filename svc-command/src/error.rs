//! Error types for the command lifecycle
//!
//! Validation failures and illegal state transitions are always fatal to the
//! call that raised them. XML decoding failures are the exception: they are
//! swallowed by the materializer and never reach callers (see
//! [`crate::materialize`]).

use thiserror::Error;

/// Errors raised by [`crate::Command`] transitions and accessors
#[derive(Debug, Error)]
pub enum CommandError {
    /// No client attached for prepare/execute
    #[error("A client must be associated with the command before it can be prepared or executed")]
    NoClient,

    /// Request accessed before prepare
    #[error("The command must be prepared before retrieving the request")]
    NotPrepared,

    /// Response or result accessed before the request completed
    #[error("The command must be executed before retrieving the response or result")]
    NotExecuted,

    /// Strict validation failed
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The operation's build hook failed
    #[error("Failed to build request for '{operation}': {source}")]
    Build {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// Error raised by the client, passed through unchanged
    #[error(transparent)]
    Client(anyhow::Error),
}

impl CommandError {
    /// Check if this is a lifecycle-ordering error
    pub fn is_state_error(&self) -> bool {
        matches!(self, Self::NoClient | Self::NotPrepared | Self::NotExecuted)
    }
}

/// A single rule violation found during strict validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("missing required argument '{name}'")]
    MissingRequired { name: String },

    #[error("argument '{name}' must be of type {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("argument '{name}' has value {value}, expected one of [{allowed}]")]
    NotAllowed {
        name: String,
        value: String,
        allowed: String,
    },
}

impl Violation {
    /// Name of the argument the violation applies to
    pub fn argument(&self) -> &str {
        match self {
            Self::MissingRequired { name }
            | Self::TypeMismatch { name, .. }
            | Self::NotAllowed { name, .. } => name,
        }
    }
}

/// Strict validation failure listing every violation found
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Validation failed: {}", format_violations(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

impl ValidationError {
    /// Names of the required arguments that were missing
    pub fn missing_arguments(&self) -> Vec<&str> {
        self.violations
            .iter()
            .filter_map(|v| match v {
                Violation::MissingRequired { name } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError {
            violations: vec![
                Violation::MissingRequired {
                    name: "id".to_string(),
                },
                Violation::TypeMismatch {
                    name: "limit".to_string(),
                    expected: "integer".to_string(),
                    actual: "string".to_string(),
                },
            ],
        };

        assert_eq!(
            err.to_string(),
            "Validation failed: missing required argument 'id'; \
             argument 'limit' must be of type integer, got string"
        );
        assert_eq!(err.missing_arguments(), vec!["id"]);
    }

    #[test]
    fn test_state_errors() {
        assert!(CommandError::NoClient.is_state_error());
        assert!(CommandError::NotExecuted.is_state_error());
        let client_err = CommandError::Client(anyhow::anyhow!("boom"));
        assert!(!client_err.is_state_error());
    }

    #[test]
    fn test_validation_converts_transparently() {
        let err: CommandError = ValidationError {
            violations: vec![Violation::MissingRequired {
                name: "id".to_string(),
            }],
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Validation failed: missing required argument 'id'"
        );
    }
}
