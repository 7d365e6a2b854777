//! CLI command implementations.

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod orders;

use clap::Args;
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

use bazaar_core::{CurrencyCode, Identity, Price};
use bazaar_storefront::api::ApiError;
use bazaar_storefront::error::ClientError;
use bazaar_storefront::session::{LoginError, RegisterError};
use bazaar_storefront::state::AppContext;

/// Errors that end a CLI command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Could not start the HTTP client: {0}")]
    Startup(#[from] ApiError),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("Login failed: {0}")]
    Login(#[from] LoginError),

    #[error("Registration failed: {0}")]
    Register(#[from] RegisterError),

    #[error("This command needs --identifier and --password (or BAZAAR_PASSWORD)")]
    CredentialsRequired,

    #[error("No product with ID {0}")]
    UnknownProduct(bazaar_core::ProductId),
}

/// Login flags shared by commands that act as a user.
#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Email or username to sign in with
    #[arg(long, env = "BAZAAR_IDENTIFIER")]
    pub identifier: Option<String>,

    /// Password for --identifier
    #[arg(long, env = "BAZAAR_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl LoginArgs {
    fn credentials(&self) -> Option<(&str, SecretString)> {
        let identifier = self.identifier.as_deref()?;
        let password = self.password.as_deref()?;
        Some((identifier, SecretString::from(password)))
    }
}

/// Restore any ambient session, then sign in if credentials were given.
///
/// Returns the resulting identity, or `None` when still anonymous.
pub async fn resolve_identity(ctx: &AppContext, login: &LoginArgs) -> Result<Option<Identity>, CliError> {
    let session = ctx.session();
    session.restore_session().await;

    match login.credentials() {
        Some((identifier, secret)) => Ok(Some(session.login(identifier, &secret).await?)),
        None => Ok(session.identity()),
    }
}

/// Like [`resolve_identity`], but anonymous is an error.
pub async fn sign_in(ctx: &AppContext, login: &LoginArgs) -> Result<Identity, CliError> {
    resolve_identity(ctx, login)
        .await?
        .ok_or(CliError::CredentialsRequired)
}

/// Format an amount in the store currency.
pub fn money(amount: Decimal) -> Price {
    Price::new(amount, CurrencyCode::default())
}
