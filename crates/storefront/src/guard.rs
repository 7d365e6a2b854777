//! Route guard: decides whether a view may render for the current session.
//!
//! Decisions are a pure function of the session state and the view's
//! declared access level. [`RouteGuard`] re-evaluates whenever the session
//! manager publishes a transition.

use std::fmt;

use tokio::sync::watch;

use bazaar_core::Role;

use crate::session::SessionState;

/// A navigation target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    Catalog,
    Login,
    Register,
    Checkout,
    OrderHistory,
    Dashboard,
}

impl View {
    pub const ALL: [Self; 7] = [
        Self::Home,
        Self::Catalog,
        Self::Login,
        Self::Register,
        Self::Checkout,
        Self::OrderHistory,
        Self::Dashboard,
    ];

    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Catalog => "/products",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Checkout => "/checkout",
            Self::OrderHistory => "/order-history",
            Self::Dashboard => "/dashboard",
        }
    }

    /// Resolve a path; unknown paths land on [`View::Home`].
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        let normalized = if trimmed.is_empty() { "/" } else { trimmed };

        Self::ALL
            .into_iter()
            .find(|view| view.path() == normalized)
            .unwrap_or(Self::Home)
    }

    /// Who may see this view.
    #[must_use]
    pub const fn access(self) -> Access {
        match self {
            Self::Home | Self::Catalog | Self::Login | Self::Register | Self::Checkout => {
                Access::Public
            }
            Self::OrderHistory => Access::Authenticated,
            Self::Dashboard => Access::Elevated,
        }
    }

    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Catalog => "Products",
            Self::Login => "Login",
            Self::Register => "Register",
            Self::Checkout => "Checkout",
            Self::OrderHistory => "Order History",
            Self::Dashboard => "Dashboard",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Access level a view declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone, signed in or not.
    Public,
    /// Any signed-in identity.
    Authenticated,
    /// Administrators and moderators.
    Elevated,
}

/// Outcome of a guard check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Identity still resolving; show a neutral placeholder.
    Placeholder,
    Render,
    Redirect(View),
}

/// Decide what to do when `state` navigates to `view`.
///
/// Rules, first match wins:
/// 1. `Loading` never redirects.
/// 2. Public views always render.
/// 3. Anonymous visitors are sent to login.
/// 4. Customers asking for an elevated view are sent to their order history.
#[must_use]
pub fn evaluate(state: &SessionState, view: View) -> Decision {
    let identity = match state {
        SessionState::Loading => return Decision::Placeholder,
        _ if view.access() == Access::Public => return Decision::Render,
        SessionState::Anonymous => return Decision::Redirect(View::Login),
        SessionState::Authenticated(identity) => identity,
    };

    match (view.access(), identity.role) {
        (Access::Public | Access::Authenticated, _)
        | (Access::Elevated, Role::Administrator | Role::Moderator) => Decision::Render,
        (Access::Elevated, Role::Customer) => Decision::Redirect(View::OrderHistory),
    }
}

/// Views to offer in the navigation menu for `state`.
#[must_use]
pub fn navigation(state: &SessionState) -> Vec<View> {
    let mut views = vec![View::Home, View::Catalog];

    match state {
        SessionState::Loading => {}
        SessionState::Anonymous => views.extend([View::Login, View::Register]),
        SessionState::Authenticated(identity) => match identity.role {
            Role::Customer => views.push(View::OrderHistory),
            Role::Administrator | Role::Moderator => views.push(View::Dashboard),
        },
    }

    views
}

/// Guard bound to a live session.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: watch::Receiver<SessionState>,
}

impl RouteGuard {
    #[must_use]
    pub const fn new(session: watch::Receiver<SessionState>) -> Self {
        Self { session }
    }

    /// Evaluate `view` against the current session.
    #[must_use]
    pub fn check(&self, view: View) -> Decision {
        evaluate(&self.session.borrow(), view)
    }

    /// Wait for the next session transition and re-evaluate `view`.
    ///
    /// Returns `None` once the session manager is gone.
    pub async fn next_decision(&mut self, view: View) -> Option<Decision> {
        self.session.changed().await.ok()?;
        Some(evaluate(&self.session.borrow_and_update(), view))
    }

    /// Wait until the session leaves `Loading`, then evaluate `view`.
    ///
    /// Returns `None` if the session manager is dropped first.
    pub async fn settled(&mut self, view: View) -> Option<Decision> {
        let state = self
            .session
            .wait_for(|state| !state.is_loading())
            .await
            .ok()?;
        Some(evaluate(&state, view))
    }
}
