use crate::data::user_repository::UserRepository;
use crate::domain::user::{CredentialsForm, USERNAME_MAX_CHARS};
use crate::domain::{CurrentUser, DomainError, User};
use crate::infrastructure::session::SessionTokens;
use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use std::sync::{Arc, OnceLock};

pub struct AuthService {
    user_repo: Arc<dyn UserRepository + Send + Sync>,
    session_tokens: Arc<SessionTokens>,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository + Send + Sync>,
        session_tokens: Arc<SessionTokens>,
    ) -> Self {
        Self {
            user_repo,
            session_tokens,
        }
    }

    pub fn session_tokens(&self) -> &SessionTokens {
        &self.session_tokens
    }

    pub async fn signup(&self, form: &CredentialsForm) -> Result<User, DomainError> {
        tracing::debug!("Signup requested for username: {}", form.username);

        let username = form.username.trim();
        if username.is_empty() {
            return Err(DomainError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        if username.chars().count() > USERNAME_MAX_CHARS {
            return Err(DomainError::ValidationError(format!(
                "Username cannot be longer than {} characters",
                USERNAME_MAX_CHARS
            )));
        }
        if form.password.is_empty() {
            return Err(DomainError::ValidationError(
                "Password cannot be empty".to_string(),
            ));
        }

        if self.user_repo.find_by_username(username).await.is_ok() {
            tracing::warn!("Signup rejected: username {} already exists", username);
            return Err(DomainError::UserAlreadyExists);
        }

        let password_hash = hash_password(&form.password)?;
        let user = self.user_repo.create(username, &password_hash).await?;

        tracing::info!(
            "User signed up: id={}, username={}",
            user.id,
            user.username
        );

        Ok(user)
    }

    /// Checks the credentials and issues a session token. Unknown usernames and
    /// wrong passwords both come back as `InvalidCredentials`.
    pub async fn login(
        &self,
        form: &CredentialsForm,
    ) -> Result<(String, CurrentUser), DomainError> {
        let user = match self.user_repo.find_by_username(form.username.trim()).await {
            Ok(user) => user,
            Err(DomainError::UserNotFound) => {
                // Same argon2 cost as a wrong password.
                verify_password(&form.password, dummy_password_hash()?)?;
                tracing::warn!("Login failed: unknown username {}", form.username);
                return Err(DomainError::InvalidCredentials);
            }
            Err(e) => return Err(e),
        };

        if !verify_password(&form.password, &user.password_hash)? {
            tracing::warn!("Login failed: wrong password for {}", user.username);
            return Err(DomainError::InvalidCredentials);
        }

        let current = CurrentUser::from(user);
        let token = self.session_tokens.issue(&current)?;

        tracing::info!(
            "User logged in: id={}, username={}",
            current.id,
            current.username
        );

        Ok((token, current))
    }

    /// Resolves a session token to the user it was issued for. Tokens for
    /// accounts that no longer exist are rejected.
    pub async fn resolve_session(&self, token: &str) -> Result<CurrentUser, DomainError> {
        let claims = self.session_tokens.verify(token)?;

        match self.user_repo.find_by_id(claims.user_id).await {
            Ok(user) => Ok(CurrentUser::from(user)),
            Err(DomainError::UserNotFound) => Err(DomainError::Unauthorized(
                "Session user no longer exists".to_string(),
            )),
            Err(e) => Err(e),
        }
    }
}

fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!("Password hashing failed: {}", e);
            DomainError::InternalError(format!("Password hashing failed: {}", e))
        })
}

/// Hash checked against when the username is unknown. Computed once with the
/// default parameters so it costs as much as a real account's hash.
fn dummy_password_hash() -> Result<&'static str, DomainError> {
    static DUMMY_HASH: OnceLock<String> = OnceLock::new();

    if let Some(hash) = DUMMY_HASH.get() {
        return Ok(hash.as_str());
    }
    let hash = hash_password("unknown-user-placeholder")?;
    Ok(DUMMY_HASH.get_or_init(|| hash).as_str())
}

fn verify_password(password: &str, password_hash: &str) -> Result<bool, DomainError> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| {
        tracing::error!("Invalid password hash format: {}", e);
        DomainError::InternalError(format!("Invalid password hash: {}", e))
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
