pub mod error;
pub mod post;
pub mod user;

pub use error::DomainError;
pub use post::Post;
pub use user::{CurrentUser, User};
