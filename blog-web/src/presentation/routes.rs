use crate::presentation::http_handlers;
use crate::presentation::middleware::require_session;
use actix_web::middleware::from_fn;
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes - authentication
        .service(
            web::resource("/signup")
                .route(web::get().to(http_handlers::signup_page))
                .route(web::post().to(http_handlers::signup)),
        )
        .service(
            web::resource("/login")
                .route(web::get().to(http_handlers::login_page))
                .route(web::post().to(http_handlers::login)),
        )
        // Protected routes - everything else
        .service(
            web::scope("")
                .wrap(from_fn(require_session))
                .service(web::resource("/").route(web::get().to(http_handlers::index)))
                .service(
                    web::resource("/create")
                        .route(web::get().to(http_handlers::create_page))
                        .route(web::post().to(http_handlers::create_post)),
                )
                .service(web::resource("/logout").route(web::get().to(http_handlers::logout)))
                .service(
                    web::resource("/{id:\\d+}/update")
                        .route(web::get().to(http_handlers::update_page))
                        .route(web::post().to(http_handlers::update_post)),
                )
                .service(
                    web::resource("/{id:\\d+}/delete")
                        .route(web::get().to(http_handlers::delete_post))
                        .route(web::post().to(http_handlers::delete_post)),
                ),
        );
}
