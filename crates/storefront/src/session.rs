//! Session and authentication state.
//!
//! The session moves between three states:
//!
//! ```text
//!                 token persisted
//!   (start) ─────────────────────────▶ Loading ──user fetched──▶ Authenticated
//!      │                                  │                          │
//!      │ no token                         │ fetch failed / 401       │ logout / 401
//!      ▼                                  ▼                          ▼
//!   Unauthenticated ◀─────────────────────┴──────────────────────────┘
//! ```
//!
//! Authentication is derived from the cached user: there is no separate flag
//! that could disagree with it.

use std::sync::{Arc, Mutex};

use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::api::ApiError;
use crate::backend::StorefrontBackend;
use crate::error::{ErrorCategory, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::models::{AuthResponse, LoginCredentials, ProfileUpdate, RegisterData, User};
use crate::storage::{TokenStore, lock};

/// Errors raised by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Passwords do not match")]
    PasswordMismatch,
}

impl SessionError {
    /// Where this error belongs in the UI's error taxonomy.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Api(e) => e.category(),
            Self::PasswordMismatch => ErrorCategory::Validation,
        }
    }
}

/// Observable session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Loading,
    Authenticated,
}

#[derive(Debug, Default)]
struct SessionInner {
    user: Option<User>,
    loading: bool,
    /// The cached user predates a change the backend made to it.
    stale: bool,
}

/// Holds the signed-in user and keeps the persisted token in step with it.
pub struct Session {
    backend: Arc<dyn StorefrontBackend>,
    tokens: TokenStore,
    inner: Mutex<SessionInner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session. It starts in `Loading` when a token is persisted and
    /// `Unauthenticated` otherwise; call [`Session::bootstrap`] to settle it.
    #[must_use]
    pub fn new(backend: Arc<dyn StorefrontBackend>, tokens: TokenStore) -> Self {
        let loading = tokens.has_token();
        Self {
            backend,
            tokens,
            inner: Mutex::new(SessionInner {
                user: None,
                loading,
                stale: false,
            }),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        let inner = lock(&self.inner);
        if inner.user.is_some() {
            SessionState::Authenticated
        } else if inner.loading {
            SessionState::Loading
        } else {
            SessionState::Unauthenticated
        }
    }

    /// Whether a user is signed in.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        lock(&self.inner).user.is_some()
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<User> {
        lock(&self.inner).user.clone()
    }

    /// The signed-in user, or the guest placeholder.
    #[must_use]
    pub fn user_or_guest(&self) -> User {
        self.user().unwrap_or_else(User::guest)
    }

    /// Settle the initial state.
    ///
    /// Without a persisted token no request is made. With one, the user is
    /// fetched; any failure clears the token.
    ///
    /// # Errors
    ///
    /// Returns the fetch error after demoting the session.
    #[instrument(skip(self))]
    pub async fn bootstrap(&self) -> Result<SessionState, SessionError> {
        if !self.tokens.has_token() {
            debug!("No persisted token, starting unauthenticated");
            self.demote();
            return Ok(SessionState::Unauthenticated);
        }

        lock(&self.inner).loading = true;
        match self.backend.current_user().await {
            Ok(user) => {
                self.authenticate(user);
                Ok(SessionState::Authenticated)
            }
            Err(e) => {
                warn!(error = %e, "Failed to restore session");
                self.tokens.clear_token();
                self.demote();
                Err(e.into())
            }
        }
    }

    /// Sign in and seed the session with the returned user.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api` if the backend refuses the credentials.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: LoginCredentials) -> Result<User, SessionError> {
        let response = self.backend.login(credentials).await?;
        Ok(self.accept(response))
    }

    /// Create an account and sign in.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::PasswordMismatch` without contacting the backend
    /// when the confirmation differs, or `SessionError::Api` if registration
    /// is refused.
    #[instrument(skip(self, data), fields(email = %data.email))]
    pub async fn register(&self, data: RegisterData) -> Result<User, SessionError> {
        if data.password.expose_secret() != data.password_confirmation.expose_secret() {
            return Err(SessionError::PasswordMismatch);
        }
        let response = self.backend.register(data).await?;
        Ok(self.accept(response))
    }

    /// Sign out. The backend is notified on a best-effort basis; local state
    /// is cleared regardless.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(e) = self.backend.logout().await {
            warn!(error = %e, "Backend logout failed, clearing local session anyway");
        }
        self.tokens.clear_token();
        self.demote();
        clear_sentry_user();
        add_breadcrumb("auth", "Signed out", None);
        info!("Signed out");
    }

    /// Refetch the signed-in user.
    ///
    /// Returns `None` without a request when no token is persisted.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api` if the fetch fails; a 401 also demotes the
    /// session.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Option<User>, SessionError> {
        if !self.tokens.has_token() {
            self.demote();
            return Ok(None);
        }
        let user = self.observed(self.backend.current_user().await)?;
        self.authenticate(user.clone());
        Ok(Some(user))
    }

    /// The signed-in user, refetched first if it was invalidated.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api` if a needed refetch fails.
    pub async fn current_user(&self) -> Result<Option<User>, SessionError> {
        let stale = lock(&self.inner).stale;
        if stale {
            return self.refresh().await;
        }
        Ok(self.user())
    }

    /// Mark the cached user as outdated; the next
    /// [`Session::current_user`] refetches it.
    pub fn invalidate(&self) {
        lock(&self.inner).stale = true;
    }

    /// Update profile fields, then refetch the user.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api` if the update or the refetch fails.
    #[instrument(skip(self, patch))]
    pub async fn update_profile(&self, patch: ProfileUpdate) -> Result<Option<User>, SessionError> {
        self.observed(self.backend.update_profile(patch).await)?;
        self.refresh().await
    }

    /// Ask the backend to resend the verification email, then refetch the user.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api` if the request or the refetch fails.
    #[instrument(skip(self))]
    pub async fn verify_email(&self) -> Result<Option<User>, SessionError> {
        self.observed(self.backend.verify_email().await)?;
        self.refresh().await
    }

    /// Demote the session if `err` says the token is no longer valid.
    ///
    /// Call this with the error of any protected request made outside the
    /// session.
    pub fn observe(&self, err: &ApiError) {
        if err.is_unauthorized() {
            debug!("Protected request returned 401, demoting session");
            self.tokens.clear_token();
            self.demote();
            clear_sentry_user();
        }
    }

    /// Pass `result` through, observing its error first.
    pub(crate) fn observed<T>(&self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(e) = &result {
            self.observe(e);
        }
        result
    }

    fn accept(&self, response: AuthResponse) -> User {
        self.tokens.set_token(&response.token);
        self.authenticate(response.user.clone());
        add_breadcrumb("auth", "Signed in", None);
        info!(user_id = %response.user.id, "Signed in");
        response.user
    }

    fn authenticate(&self, user: User) {
        set_sentry_user(&user.id, Some(&user.email));
        let mut inner = lock(&self.inner);
        inner.user = Some(user);
        inner.loading = false;
        inner.stale = false;
    }

    fn demote(&self) {
        *lock(&self.inner) = SessionInner::default();
    }
}
