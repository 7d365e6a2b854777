//! Account commands.

use secrecy::SecretString;

use bazaar_storefront::guard::navigation;
use bazaar_storefront::session::SessionState;
use bazaar_storefront::state::AppContext;

use super::{CliError, LoginArgs, resolve_identity};

/// Report the current identity and the views it can reach.
///
/// A failed login is reported but leaves the restored session in place.
#[allow(clippy::print_stdout)]
pub async fn whoami(ctx: &AppContext, login: &LoginArgs) {
    if let Err(e) = resolve_identity(ctx, login).await {
        println!("{e}");
    }

    let state = ctx.session().state();
    match &state {
        SessionState::Authenticated(identity) => println!(
            "Signed in as {} <{}> ({})",
            identity.name, identity.email, identity.role
        ),
        SessionState::Anonymous | SessionState::Loading => println!("Not signed in."),
    }

    let views: Vec<_> = navigation(&state).iter().map(|v| v.label()).collect();
    println!("Menu: {}", views.join(" | "));
}

/// Create an account and report the new identity.
#[allow(clippy::print_stdout)]
pub async fn register(
    ctx: &AppContext,
    name: &str,
    email: &str,
    password: SecretString,
) -> Result<(), CliError> {
    let identity = ctx.session().register(name, email, &password).await?;
    println!("Welcome, {}! Account {} created.", identity.name, identity.id);
    Ok(())
}
