use crate::domain::DomainError;
use serde::Serialize;
use std::sync::Arc;
use tera::{Context, Tera};

const TEMPLATES: [(&str, &str); 6] = [
    ("base.html", include_str!("../../templates/base.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("create.html", include_str!("../../templates/create.html")),
    ("update.html", include_str!("../../templates/update.html")),
    ("signup.html", include_str!("../../templates/signup.html")),
    ("login.html", include_str!("../../templates/login.html")),
];

/// Compiled page templates, shared by every worker.
#[derive(Clone)]
pub struct Views {
    tera: Arc<Tera>,
}

impl Views {
    pub fn new() -> Result<Self, DomainError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;

        tracing::debug!("Loaded {} templates", TEMPLATES.len());

        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    pub fn render(&self, template: &str, context: &impl Serialize) -> Result<String, DomainError> {
        let context = Context::from_serialize(context)?;
        Ok(self.tera.render(template, &context)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct LoginPage<'a> {
        user: Option<()>,
        username: &'a str,
        error: Option<&'a str>,
    }

    #[test]
    fn rendered_values_are_escaped() {
        let views = Views::new().unwrap();

        let html = views
            .render(
                "login.html",
                &LoginPage {
                    user: None,
                    username: "<script>",
                    error: Some("Invalid username or password"),
                },
            )
            .unwrap();

        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("Invalid username or password"));
    }

    #[derive(Serialize)]
    struct EmptyIndex {
        user: Option<()>,
        posts: Vec<()>,
    }

    #[test]
    fn pages_without_an_error_render_no_alert() {
        let views = Views::new().unwrap();

        let html = views
            .render(
                "index.html",
                &EmptyIndex {
                    user: None,
                    posts: Vec::new(),
                },
            )
            .unwrap();

        assert!(html.contains("No posts yet."));
        assert!(!html.contains("alert-danger"));
    }

    #[test]
    fn unknown_template_is_an_internal_error() {
        let views = Views::new().unwrap();

        let result = views.render("missing.html", &empty_login_page());

        assert!(matches!(result, Err(DomainError::InternalError(_))));
    }

    fn empty_login_page() -> LoginPage<'static> {
        LoginPage {
            user: None,
            username: "",
            error: None,
        }
    }
}
