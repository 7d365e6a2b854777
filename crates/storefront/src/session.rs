//! Session manager: the single source of truth for who is signed in.
//!
//! State machine:
//!
//! ```text
//! Loading ──restore──▶ Authenticated | Anonymous
//! Anonymous ──login/register──▶ Authenticated
//! Authenticated ──logout──▶ Anonymous
//! ```
//!
//! `Loading` only exists before the first restore settles. Every transition
//! is published on a `watch` channel so route guards and views re-evaluate.
//!
//! Overlapping calls are not serialized: each one writes an absolute state,
//! so the last call to settle wins.

use std::future::Future;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, instrument, warn};

use bazaar_core::{Email, Identity};

use crate::api::{ApiClient, ApiError, Credentials, RegisteredAccount, Registration};
use crate::error::{FieldError, clear_sentry_user, set_sentry_user};

/// Minimum accepted length for a new account secret.
pub const MIN_SECRET_LENGTH: usize = 6;

/// Authentication state of the application.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Identity not yet determined; nothing should redirect.
    #[default]
    Loading,
    /// Determined: nobody is signed in.
    Anonymous,
    /// Determined: this identity is signed in.
    Authenticated(Identity),
}

impl SessionState {
    /// The signed-in identity, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        match self {
            Self::Authenticated(identity) => Some(identity),
            Self::Loading | Self::Anonymous => None,
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Why a login attempt failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoginError {
    /// A required field was left empty.
    #[error("{0}")]
    Validation(FieldError),
    /// The backend rejected the identifier/secret pair.
    #[error("{0}")]
    InvalidCredentials(String),
    /// The request could not complete.
    #[error("{0}")]
    Unreachable(String),
}

/// Why a registration attempt failed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegisterError {
    /// An account with this email already exists.
    #[error("{0}")]
    DuplicateAccount(String),
    /// Input was rejected locally or by the backend.
    #[error("{}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Validation(Vec<FieldError>),
    /// The request could not complete.
    #[error("{0}")]
    Unreachable(String),
}

/// Backend operations the session manager depends on.
///
/// [`ApiClient`] is the production implementation; tests substitute fakes.
pub trait AuthApi: Send + Sync {
    /// Resolve the ambient session; `Ok(None)` means "no valid session".
    fn current_identity(&self) -> impl Future<Output = Result<Option<Identity>, ApiError>> + Send;

    /// Establish a session for the credentials.
    fn login(&self, credentials: &Credentials) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Create an account and return the freshly issued identity.
    fn register(
        &self,
        registration: &Registration,
    ) -> impl Future<Output = Result<RegisteredAccount, ApiError>> + Send;

    /// Terminate the session on the backend.
    fn logout(&self) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Attach a token issued at registration to later requests.
    fn remember_token(&self, _token: SecretString) {}

    /// Drop any token attached by [`Self::remember_token`].
    fn forget_token(&self) {}
}

impl AuthApi for ApiClient {
    async fn current_identity(&self) -> Result<Option<Identity>, ApiError> {
        Self::current_identity(self).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        Self::login(self, credentials).await
    }

    async fn register(&self, registration: &Registration) -> Result<RegisteredAccount, ApiError> {
        Self::register(self, registration).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        Self::logout(self).await
    }

    fn remember_token(&self, token: SecretString) {
        self.set_bearer_token(token);
    }

    fn forget_token(&self) {
        self.clear_bearer_token();
    }
}

/// Tracks the authenticated identity and publishes every change.
pub struct SessionManager<A> {
    api: A,
    state: watch::Sender<SessionState>,
}

impl<A: AuthApi> SessionManager<A> {
    /// Create a manager in the `Loading` state.
    ///
    /// Call [`Self::restore_session`] once at startup to leave it.
    #[must_use]
    pub fn new(api: A) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        Self { api, state }
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// The signed-in identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.state.borrow().identity().cloned()
    }

    /// Observe state transitions.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// The backend collaborator.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Ask the backend who is signed in, using whatever ambient credential
    /// the client already holds.
    ///
    /// A transport failure is treated exactly like "no session". This can
    /// sign a user out on a transient network blip; it is kept deliberately
    /// until the product owner decides otherwise, and logged when it happens.
    #[instrument(skip(self))]
    pub async fn restore_session(&self) -> SessionState {
        let next = match self.api.current_identity().await {
            Ok(Some(identity)) => SessionState::Authenticated(identity),
            Ok(None) => SessionState::Anonymous,
            Err(ApiError::Parse(e)) => {
                let event_id = sentry::capture_error(&e);
                error!(
                    error = %e,
                    sentry_event_id = %event_id,
                    "Backend identity could not be decoded; continuing as anonymous"
                );
                SessionState::Anonymous
            }
            Err(e) => {
                warn!(error = %e, "Session restore failed; continuing as anonymous");
                SessionState::Anonymous
            }
        };

        self.publish(next.clone());
        next
    }

    /// Sign in with an identifier (email or username) and secret.
    ///
    /// On success the canonical identity is re-read from the backend rather
    /// than taken from the login response.
    ///
    /// # Errors
    ///
    /// Returns `LoginError::InvalidCredentials` when the backend rejects the
    /// pair and `LoginError::Unreachable` when the call cannot complete. The
    /// current state is left untouched on failure.
    #[instrument(skip(self, secret))]
    pub async fn login(&self, identifier: &str, secret: &SecretString) -> Result<Identity, LoginError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(LoginError::Validation(FieldError::new(
                "identifier",
                "Email or username is required",
            )));
        }
        if secret.expose_secret().is_empty() {
            return Err(LoginError::Validation(FieldError::new(
                "password",
                "Password is required",
            )));
        }

        let credentials = Credentials {
            identifier: identifier.to_owned(),
            password: secret.clone(),
        };

        self.api
            .login(&credentials)
            .await
            .map_err(login_failure)?;

        // The backend accepted the credentials, so a missing identity here
        // means the session did not stick.
        let identity = match self.api.current_identity().await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                return Err(LoginError::InvalidCredentials(
                    "Login failed: the session could not be established".to_string(),
                ));
            }
            Err(e) => return Err(login_failure(e)),
        };

        info!(user_id = %identity.id, role = %identity.role, "Signed in");
        set_sentry_user(&identity.id, Some(identity.email.as_str()));
        self.publish(SessionState::Authenticated(identity.clone()));
        Ok(identity)
    }

    /// Create an account and sign in as it.
    ///
    /// # Errors
    ///
    /// Returns `RegisterError::Validation` for rejected input,
    /// `RegisterError::DuplicateAccount` when the email is taken, and
    /// `RegisterError::Unreachable` when the call cannot complete. The
    /// current state is left untouched on failure.
    #[instrument(skip(self, secret))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        secret: &SecretString,
    ) -> Result<Identity, RegisterError> {
        let registration = validate_registration(name, email, secret)?;

        let account = self
            .api
            .register(&registration)
            .await
            .map_err(register_failure)?;

        if let Some(token) = account.token {
            self.api.remember_token(token);
        }

        let identity = account.user;
        info!(user_id = %identity.id, "Registered new account");
        set_sentry_user(&identity.id, Some(identity.email.as_str()));
        self.publish(SessionState::Authenticated(identity.clone()));
        Ok(identity)
    }

    /// Sign out. Backend failure is logged and ignored; local state always
    /// becomes `Anonymous`.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "Backend logout failed; clearing local session anyway");
        }

        self.api.forget_token();
        clear_sentry_user();
        self.publish(SessionState::Anonymous);
    }

    fn publish(&self, next: SessionState) {
        self.state.send_replace(next);
    }
}

fn validate_registration(
    name: &str,
    email: &str,
    secret: &SecretString,
) -> Result<Registration, RegisterError> {
    let mut errors = Vec::new();

    let name = name.trim();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Username is required"));
    }

    let email = match Email::parse(email) {
        Ok(email) => Some(email),
        Err(e) => {
            errors.push(FieldError::new("email", e.to_string()));
            None
        }
    };

    if secret.expose_secret().chars().count() < MIN_SECRET_LENGTH {
        errors.push(FieldError::new(
            "password",
            format!("Password must be at least {MIN_SECRET_LENGTH} characters"),
        ));
    }

    match email {
        Some(email) if errors.is_empty() => Ok(Registration {
            name: name.to_owned(),
            email,
            password: secret.clone(),
        }),
        _ => Err(RegisterError::Validation(errors)),
    }
}

fn login_failure(err: ApiError) -> LoginError {
    match err {
        ApiError::Status {
            status: 400 | 401 | 403,
            message,
        } => LoginError::InvalidCredentials(message),
        other => {
            warn!(error = %other, "Login request failed");
            LoginError::Unreachable("Could not reach the service. Please try again.".to_string())
        }
    }
}

fn register_failure(err: ApiError) -> RegisterError {
    match err {
        ApiError::Status {
            status: 409,
            message,
        } => RegisterError::DuplicateAccount(message),
        ApiError::Status { status, message } if status < 500 => {
            RegisterError::Validation(vec![FieldError::new("form", message)])
        }
        other => {
            warn!(error = %other, "Registration request failed");
            RegisterError::Unreachable("Could not reach the service. Please try again.".to_string())
        }
    }
}
