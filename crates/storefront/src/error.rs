//! Unified client error taxonomy with Sentry integration.
//!
//! Every backend-call failure is caught where it happens and converted into
//! one [`ClientError`] kind plus a human-readable message. Nothing propagates
//! to a global handler; callers decide between an inline field error and a
//! page-level banner via [`ClientError::presentation`].

use thiserror::Error;

use crate::api::ApiError;

/// A validation problem attached to one input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Name of the offending field (`name`, `email`, `cart`, ...).
    pub field: String,
    /// Message shown next to the field.
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Malformed or missing input.
    #[error("Validation failed: {}", format_field_errors(.0))]
    Validation(Vec<FieldError>),

    /// Invalid credentials, or an expired/absent session.
    #[error("Authentication required: {0}")]
    Auth(String),

    /// The request conflicts with existing state (e.g. duplicate account).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unknown resource (e.g. tracking id).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network or transport failure; retrying may help.
    #[error("Service unreachable: {0}")]
    Unreachable(String),
}

/// How a [`ClientError`] should be surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    /// Next to the named input field.
    Inline { field: String },
    /// As a dismissable page-level banner.
    Banner,
}

impl ClientError {
    /// Shorthand for a single-field validation error.
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, message)])
    }

    /// Where the error belongs in the UI.
    ///
    /// Validation errors are shown inline next to their first field; every
    /// other kind is a banner.
    #[must_use]
    pub fn presentation(&self) -> Presentation {
        match self {
            Self::Validation(errors) => errors.first().map_or(Presentation::Banner, |e| {
                Presentation::Inline {
                    field: e.field.clone(),
                }
            }),
            Self::Auth(_) | Self::Conflict(_) | Self::NotFound(_) | Self::Unreachable(_) => {
                Presentation::Banner
            }
        }
    }

    /// Whether repeating the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }

    /// Field errors carried by a validation failure (empty for other kinds).
    #[must_use]
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl From<ApiError> for ClientError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, message } => match status {
                400 | 422 => Self::invalid("form", message),
                401 | 403 => Self::Auth(message),
                404 => Self::NotFound(message),
                409 => Self::Conflict(message),
                _ => {
                    tracing::error!(status, message = %message, "Backend returned an error status");
                    Self::Unreachable(format!("The service returned an error ({status}). Please try again."))
                }
            },
            ApiError::Http(e) => {
                tracing::warn!(error = %e, "Backend request failed");
                Self::Unreachable("Could not reach the service. Please try again.".to_string())
            }
            ApiError::Parse(e) => {
                let event_id = sentry::capture_error(&e);
                tracing::error!(error = %e, sentry_event_id = %event_id, "Unexpected backend response");
                Self::Unreachable("The service sent an unexpected response.".to_string())
            }
            ApiError::InvalidUrl(e) => {
                tracing::error!(error = %e, "Could not build backend URL");
                Self::Unreachable("The service address is misconfigured.".to_string())
            }
        }
    }
}

fn format_field_errors(errors: &[FieldError]) -> String {
    if errors.is_empty() {
        return "(no details)".to_string();
    }

    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias for `ClientError`.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
