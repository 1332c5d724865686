//! Result and error types for screen objects.

use thiserror::Error;

use crate::driver::DriverError;

/// Result type for screen-object operations
pub type ScreenResult<T> = Result<T, ScreenError>;

/// Errors surfaced by element handles, accessors and screens.
///
/// Predicate-style operations (`exists`, `enabled`, `checked`, ...) never
/// return these; they fold every lookup failure into `false`.
#[derive(Debug, Error)]
pub enum ScreenError {
    /// The element could not be resolved through its locator
    #[error("Element '{element}' not found using {locator}: {message}")]
    NotFound {
        /// Declared element name
        element: String,
        /// Locator that was used
        locator: String,
        /// Driver message
        message: String,
    },

    /// The bounded scroll search ran out of time
    #[error("Unable to find element '{element}' using {locator} after scrolling {direction} for {ms}ms")]
    ScrollTimeout {
        /// Declared element name
        element: String,
        /// Locator that was searched for
        locator: String,
        /// Scroll direction
        direction: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// An action failed after the element was resolved
    #[error("Failed to {action} element '{element}' using {locator}: {message}")]
    Interaction {
        /// Declared element name
        element: String,
        /// Locator that was used
        locator: String,
        /// Attempted action (tap, set text, swipe, ...)
        action: String,
        /// Driver message
        message: String,
    },

    /// Malformed locator declaration
    #[error("Invalid locator '{input}': {reason}")]
    InvalidLocator {
        /// Locator as declared
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// The element was found but its geometry could not be read
    #[error("Unable to read geometry of element '{element}' using {locator}: {message}")]
    Geometry {
        /// Declared element name
        element: String,
        /// Locator that was used
        locator: String,
        /// Driver message
        message: String,
    },

    /// A wait condition did not hold in time
    #[error("{message} (timed out after {ms}ms)")]
    Timeout {
        /// Caller supplied message
        message: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// No generated operation with this name exists for the element
    #[error("Element '{element}' has no operation named '{operation}'")]
    UnknownOperation {
        /// Declared element name (or screen name)
        element: String,
        /// Requested operation name
        operation: String,
    },

    /// The operation was invoked with the wrong arguments
    #[error("Invalid argument for '{operation}': {message}")]
    InvalidArgument {
        /// Operation name
        operation: String,
        /// Error message
        message: String,
    },

    /// Screen lookup in a registry failed
    #[error("No screen registered under '{name}'")]
    UnknownScreen {
        /// Requested screen name
        name: String,
    },

    /// Raw driver failure outside of an element context
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScreenError {
    /// Create a not-found error
    #[must_use]
    pub fn not_found(
        element: impl Into<String>,
        locator: impl ToString,
        message: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            element: element.into(),
            locator: locator.to_string(),
            message: message.into(),
        }
    }

    /// Create an interaction error
    #[must_use]
    pub fn interaction(
        element: impl Into<String>,
        locator: impl ToString,
        action: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Interaction {
            element: element.into(),
            locator: locator.to_string(),
            action: action.into(),
            message: message.into(),
        }
    }

    /// Create an invalid-locator error
    #[must_use]
    pub fn invalid_locator(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidLocator {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid-argument error
    #[must_use]
    pub fn invalid_argument(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Whether this is a lookup miss rather than a hard failure
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Driver(DriverError::NoSuchElement { .. })
        )
    }

    /// Whether a bounded search or wait expired
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::ScrollTimeout { .. } | Self::Timeout { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_timeout_message_names_element_and_locator() {
        let err = ScreenError::ScrollTimeout {
            element: "submit".into(),
            locator: "id=submit_btn".into(),
            direction: "down".into(),
            ms: 1000,
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Unable to find element 'submit'"));
        assert!(msg.contains("id=submit_btn"));
        assert!(msg.contains("1000ms"));
        assert!(err.is_timeout());
    }

    #[test]
    fn test_interaction_helper() {
        let err = ScreenError::interaction("login", "id=login", "tap", "stale");
        assert_eq!(
            err.to_string(),
            "Failed to tap element 'login' using id=login: stale"
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_driver_no_such_element_counts_as_not_found() {
        let err = ScreenError::from(DriverError::no_such_element("id=x"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_invalid_locator_message() {
        let err = ScreenError::invalid_locator("bogus~", "empty value");
        assert_eq!(err.to_string(), "Invalid locator 'bogus~': empty value");
    }
}
