use serde::{Deserialize, Serialize};

pub const USERNAME_MAX_CHARS: usize = 20;

/// Stored account. Carries no session behaviour of its own; see
/// [`SessionSubject`] and [`CurrentUser`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Anything a login session can be issued for.
pub trait SessionSubject {
    fn subject_id(&self) -> i64;
    fn subject_name(&self) -> &str;
}

/// The authenticated identity attached to a request by the session middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

impl SessionSubject for CurrentUser {
    fn subject_id(&self) -> i64 {
        self.id
    }

    fn subject_name(&self) -> &str {
        &self.username
    }
}
