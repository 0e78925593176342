use crate::application::{AuthService, BlogService};
use crate::domain::post::{PostForm, PostView};
use crate::domain::user::CredentialsForm;
use crate::domain::{CurrentUser, DomainError};
use crate::infrastructure::session::SessionCookie;
use crate::presentation::middleware::LOGIN_PATH;
use crate::presentation::views::Views;
use actix_web::http::{header, StatusCode};
use actix_web::{web, HttpResponse};
use serde::Serialize;
use std::sync::Arc;

const HOME_PATH: &str = "/";

#[derive(Serialize)]
struct IndexPage<'a> {
    user: Option<&'a CurrentUser>,
    posts: Vec<PostView>,
}

/// Shared by the create and update forms; `post_id` is set when editing.
#[derive(Serialize)]
struct PostFormPage<'a> {
    user: Option<&'a CurrentUser>,
    post_id: Option<i64>,
    form: &'a PostForm,
    error: Option<String>,
}

#[derive(Serialize)]
struct CredentialsPage<'a> {
    user: Option<&'a CurrentUser>,
    username: &'a str,
    error: Option<String>,
}

fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Plain-text error page. Server errors are logged and never shown to the client.
fn error_to_response(err: DomainError) -> HttpResponse {
    let status = StatusCode::from_u16(err.to_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
        return HttpResponse::build(status)
            .content_type("text/plain; charset=utf-8")
            .body("Internal server error");
    }

    HttpResponse::build(status)
        .content_type("text/plain; charset=utf-8")
        .body(err.to_string())
}

fn render(
    views: &Views,
    status: StatusCode,
    template: &str,
    context: &impl Serialize,
) -> HttpResponse {
    match views.render(template, context) {
        Ok(html) => HttpResponse::build(status)
            .content_type("text/html; charset=utf-8")
            .body(html),
        Err(err) => error_to_response(err),
    }
}

/// Errors a form page reports inline instead of failing the request.
fn is_form_error(err: &DomainError) -> bool {
    matches!(
        err,
        DomainError::ValidationError(_)
            | DomainError::UserAlreadyExists
            | DomainError::InvalidCredentials
    )
}

fn form_status(err: &DomainError) -> StatusCode {
    StatusCode::from_u16(err.to_status_code()).unwrap_or(StatusCode::BAD_REQUEST)
}

// ============== Auth Handlers ==============

pub async fn signup_page(views: web::Data<Views>) -> HttpResponse {
    render(
        &views,
        StatusCode::OK,
        "signup.html",
        &CredentialsPage {
            user: None,
            username: "",
            error: None,
        },
    )
}

pub async fn signup(
    views: web::Data<Views>,
    auth_service: web::Data<Arc<AuthService>>,
    form: web::Form<CredentialsForm>,
) -> HttpResponse {
    match auth_service.signup(&form).await {
        Ok(_) => redirect(LOGIN_PATH),
        Err(err) if is_form_error(&err) => render(
            &views,
            form_status(&err),
            "signup.html",
            &CredentialsPage {
                user: None,
                username: &form.username,
                error: Some(err.to_string()),
            },
        ),
        Err(err) => error_to_response(err),
    }
}

pub async fn login_page(views: web::Data<Views>) -> HttpResponse {
    render(
        &views,
        StatusCode::OK,
        "login.html",
        &CredentialsPage {
            user: None,
            username: "",
            error: None,
        },
    )
}

pub async fn login(
    views: web::Data<Views>,
    auth_service: web::Data<Arc<AuthService>>,
    session_cookie: web::Data<SessionCookie>,
    form: web::Form<CredentialsForm>,
) -> HttpResponse {
    match auth_service.login(&form).await {
        Ok((token, _user)) => HttpResponse::SeeOther()
            .insert_header((header::LOCATION, HOME_PATH))
            .cookie(session_cookie.build(token))
            .finish(),
        Err(err) if is_form_error(&err) => render(
            &views,
            form_status(&err),
            "login.html",
            &CredentialsPage {
                user: None,
                username: &form.username,
                error: Some(err.to_string()),
            },
        ),
        Err(err) => error_to_response(err),
    }
}

pub async fn logout(
    user: web::ReqData<CurrentUser>,
    session_cookie: web::Data<SessionCookie>,
) -> HttpResponse {
    tracing::info!("User logged out: id={}", user.id);

    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, LOGIN_PATH))
        .cookie(session_cookie.removal())
        .finish()
}

// ============== Post Handlers ==============

pub async fn index(
    views: web::Data<Views>,
    blog_service: web::Data<Arc<BlogService>>,
    user: web::ReqData<CurrentUser>,
) -> HttpResponse {
    match blog_service.list_posts().await {
        Ok(posts) => render(
            &views,
            StatusCode::OK,
            "index.html",
            &IndexPage {
                user: Some(&user),
                posts: posts.into_iter().map(PostView::from).collect(),
            },
        ),
        Err(err) => error_to_response(err),
    }
}

pub async fn create_page(views: web::Data<Views>, user: web::ReqData<CurrentUser>) -> HttpResponse {
    render(
        &views,
        StatusCode::OK,
        "create.html",
        &PostFormPage {
            user: Some(&user),
            post_id: None,
            form: &PostForm::default(),
            error: None,
        },
    )
}

pub async fn create_post(
    views: web::Data<Views>,
    blog_service: web::Data<Arc<BlogService>>,
    user: web::ReqData<CurrentUser>,
    form: web::Form<PostForm>,
) -> HttpResponse {
    tracing::info!("Creating post for user_id={}", user.id);

    match blog_service.create_post(&form).await {
        Ok(_) => redirect(HOME_PATH),
        Err(err) if is_form_error(&err) => render(
            &views,
            form_status(&err),
            "create.html",
            &PostFormPage {
                user: Some(&user),
                post_id: None,
                form: &form,
                error: Some(err.to_string()),
            },
        ),
        Err(err) => error_to_response(err),
    }
}

pub async fn update_page(
    views: web::Data<Views>,
    blog_service: web::Data<Arc<BlogService>>,
    user: web::ReqData<CurrentUser>,
    path: web::Path<i64>,
) -> HttpResponse {
    let post_id = path.into_inner();

    match blog_service.get_post(post_id).await {
        Ok(post) => render(
            &views,
            StatusCode::OK,
            "update.html",
            &PostFormPage {
                user: Some(&user),
                post_id: Some(post.id),
                form: &PostForm::from(&post),
                error: None,
            },
        ),
        Err(err) => error_to_response(err),
    }
}

pub async fn update_post(
    views: web::Data<Views>,
    blog_service: web::Data<Arc<BlogService>>,
    user: web::ReqData<CurrentUser>,
    path: web::Path<i64>,
    form: web::Form<PostForm>,
) -> HttpResponse {
    let post_id = path.into_inner();

    tracing::info!("Updating post id={} for user_id={}", post_id, user.id);

    match blog_service.update_post(post_id, &form).await {
        Ok(_) => redirect(HOME_PATH),
        Err(err) if is_form_error(&err) => render(
            &views,
            form_status(&err),
            "update.html",
            &PostFormPage {
                user: Some(&user),
                post_id: Some(post_id),
                form: &form,
                error: Some(err.to_string()),
            },
        ),
        Err(err) => error_to_response(err),
    }
}

pub async fn delete_post(
    blog_service: web::Data<Arc<BlogService>>,
    user: web::ReqData<CurrentUser>,
    path: web::Path<i64>,
) -> HttpResponse {
    let post_id = path.into_inner();

    tracing::info!("Deleting post id={} for user_id={}", post_id, user.id);

    match blog_service.delete_post(post_id).await {
        Ok(()) => redirect(HOME_PATH),
        Err(err) => error_to_response(err),
    }
}
