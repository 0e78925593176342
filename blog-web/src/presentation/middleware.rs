use crate::application::AuthService;
use crate::domain::DomainError;
use crate::infrastructure::session::{SessionCookie, SESSION_COOKIE};
use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::middleware::Next;
use actix_web::{http::header, web, Error, HttpMessage, HttpResponse};
use std::sync::Arc;

pub const LOGIN_PATH: &str = "/login";

/// Session gate for protected routes. Attaches the resolved
/// [`CurrentUser`](crate::domain::CurrentUser) to the request extensions, or
/// redirects to the login page.
pub async fn require_session<B: MessageBody + 'static>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error> {
    let token = match req.cookie(SESSION_COOKIE) {
        Some(cookie) => cookie.value().to_string(),
        None => return Ok(redirect_to_login(req, false)),
    };

    let auth_service = match req.app_data::<web::Data<Arc<AuthService>>>() {
        Some(service) => service.get_ref().clone(),
        None => {
            return Err(actix_web::error::ErrorInternalServerError(
                "Auth service not configured",
            ));
        }
    };

    match auth_service.resolve_session(&token).await {
        Ok(user) => {
            tracing::debug!("Session resolved for user_id: {}", user.id);
            req.extensions_mut().insert(user);
            next.call(req)
                .await
                .map(ServiceResponse::map_into_left_body)
        }
        Err(DomainError::Unauthorized(reason)) => {
            tracing::debug!("Rejecting session for {}: {}", req.path(), reason);
            Ok(redirect_to_login(req, true))
        }
        Err(e) => {
            tracing::error!("Failed to resolve session: {}", e);
            Err(actix_web::error::ErrorInternalServerError(
                "Internal server error",
            ))
        }
    }
}

fn redirect_to_login<B>(req: ServiceRequest, clear_cookie: bool) -> ServiceResponse<EitherBody<B>> {
    let mut response = HttpResponse::SeeOther();
    response.insert_header((header::LOCATION, LOGIN_PATH));

    if clear_cookie {
        if let Some(cookies) = req.app_data::<web::Data<SessionCookie>>() {
            response.cookie(cookies.removal());
        }
    }

    req.into_response(response.finish().map_into_right_body())
}
