use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub const TITLE_MAX_CHARS: usize = 40;
pub const BODY_MAX_CHARS: usize = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<FixedOffset>,
}

/// Submitted create/update form. Missing fields deserialize as empty strings
/// so they are rejected by validation instead of by the extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct PostView {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub created_at: String,
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            body: post.body,
            created_at: post.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

impl From<&Post> for PostForm {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            body: post.body.clone(),
        }
    }
}
