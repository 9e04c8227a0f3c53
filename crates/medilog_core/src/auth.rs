//! crates/medilog_core/src/auth.rs
//!
//! Register, login, external sign-in and logout. Each success writes the
//! session and reports where the client should go next.

use crate::domain::{ExternalIdentity, Role, User, UserProfile};
use crate::navigation::{self, LANDING_PATH};
use crate::ports::{
    DatabaseService, ExternalIdentityProvider, PasswordHasher, PortError,
};
use crate::session::SessionStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Email {0} is already registered")]
    EmailTaken(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("User profile not found")]
    ProfileNotFound,
    #[error("External sign-in rejected")]
    ExternalRejected,
    #[error("External sign-in is not configured")]
    Unsupported,
    #[error(transparent)]
    Port(#[from] PortError),
}

/// The result of a successful auth action.
#[derive(Debug, Clone)]
pub struct AuthOutcome {
    pub user: User,
    pub session_token: String,
    pub redirect: String,
}

#[derive(Clone)]
pub struct AuthGateway {
    db: Arc<dyn DatabaseService>,
    sessions: SessionStore,
    hasher: Arc<dyn PasswordHasher>,
    external: Option<Arc<dyn ExternalIdentityProvider>>,
}

impl AuthGateway {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        sessions: SessionStore,
        hasher: Arc<dyn PasswordHasher>,
        external: Option<Arc<dyn ExternalIdentityProvider>>,
    ) -> Self {
        Self {
            db,
            sessions,
            hasher,
            external,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<AuthOutcome, AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::MissingField("Email"));
        }
        if password.is_empty() {
            return Err(AuthError::MissingField("Password"));
        }

        let hashed = self.hasher.hash(password).await?;
        let credential = self
            .db
            .create_credential(email, &hashed)
            .await
            .map_err(|e| match e {
                PortError::Conflict(_) => AuthError::EmailTaken(email.to_string()),
                other => AuthError::Port(other),
            })?;

        let profile = UserProfile {
            name: name.trim().to_string(),
            email: email.to_string(),
            role,
            created_at: Utc::now(),
        };
        self.db.put_profile(credential.user_id, &profile).await?;
        info!("Registered {} as {}", credential.user_id, role);

        self.start_session(profile.into_user(credential.user_id)).await
    }

    /// `_role` is accepted for parity with the login form; the stored role wins.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        _role: Option<Role>,
    ) -> Result<AuthOutcome, AuthError> {
        let credential = match self.db.get_credential_by_email(email.trim()).await {
            Ok(credential) => credential,
            Err(PortError::NotFound(_)) => return Err(AuthError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };

        if !self
            .hasher
            .verify(password, &credential.hashed_password)
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        let profile = self
            .db
            .get_profile(credential.user_id)
            .await?
            .ok_or(AuthError::ProfileNotFound)?;

        let user = User {
            id: credential.user_id,
            name: profile.name,
            email: if profile.email.is_empty() {
                credential.email
            } else {
                profile.email
            },
            role: profile.role,
        };
        self.start_session(user).await
    }

    pub async fn login_with_google(&self, id_token: &str) -> Result<AuthOutcome, AuthError> {
        let provider = self.external.as_ref().ok_or(AuthError::Unsupported)?;
        let identity = provider.verify(id_token).await.map_err(|e| match e {
            PortError::Unauthorized | PortError::NotFound(_) => AuthError::ExternalRejected,
            other => AuthError::Port(other),
        })?;

        let user_id = external_user_id(&identity);
        let name = identity.display_name.clone().unwrap_or_default();
        let email = identity.email.clone().unwrap_or_default();

        let user = match self.db.get_profile(user_id).await? {
            Some(profile) => User {
                id: user_id,
                name: if profile.name.is_empty() { name } else { profile.name },
                email: if profile.email.is_empty() { email } else { profile.email },
                role: profile.role,
            },
            None => {
                let profile = UserProfile {
                    name,
                    email,
                    role: Role::Patient,
                    created_at: Utc::now(),
                };
                self.db.put_profile(user_id, &profile).await?;
                info!("Created profile for external identity {}", user_id);
                profile.into_user(user_id)
            }
        };
        self.start_session(user).await
    }

    /// Forgets the session and returns the landing page.
    pub async fn logout(&self, session_token: Option<&str>) -> Result<String, AuthError> {
        match session_token {
            Some(token) => self.sessions.close(token).await?,
            None => warn!("Logout without a session"),
        }
        Ok(LANDING_PATH.to_string())
    }

    pub async fn current_user(&self, session_token: &str) -> Result<Option<User>, AuthError> {
        Ok(self.sessions.current(session_token).await?)
    }

    /// Evaluates the route guard for whoever holds `session_token`.
    pub async fn guard(
        &self,
        session_token: Option<&str>,
        path: &str,
    ) -> Result<Option<String>, AuthError> {
        let user = match session_token {
            Some(token) => self.sessions.current(token).await?,
            None => None,
        };
        Ok(navigation::guard(user.as_ref(), path))
    }

    async fn start_session(&self, user: User) -> Result<AuthOutcome, AuthError> {
        let session_token = self.sessions.open(&user).await?;
        let redirect = user.role.dashboard_path().to_string();
        Ok(AuthOutcome {
            user,
            session_token,
            redirect,
        })
    }
}

/// Stable id for an external identity so repeated sign-ins find the same profile.
pub fn external_user_id(identity: &ExternalIdentity) -> Uuid {
    Uuid::new_v5(
        &Uuid::NAMESPACE_URL,
        format!("google:{}", identity.subject).as_bytes(),
    )
}
