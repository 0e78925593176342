use dotenvy::dotenv;
use std::sync::Arc;

mod application;
mod data;
mod domain;
mod infrastructure;
mod presentation;

use application::{AuthService, BlogService};
use chrono::Duration;
use data::{post_repository::SqlitePostRepository, user_repository::SqliteUserRepository};
use infrastructure::{
    config::AppConfig,
    database::{create_pool, run_migrations},
    logging::init_logging,
    session::{SessionCookie, SessionTokens},
};
use presentation::{routes, views::Views};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    init_logging();

    let config = AppConfig::from_env()?;
    let http_addr = config.http_addr();

    tracing::info!("Starting blog server...");
    tracing::info!("HTTP server will listen on {}", http_addr);

    // Initialize database connection pool
    tracing::info!("Connecting to database...");
    let pool = create_pool(&config.database_url, config.database_max_connections).await?;

    tracing::info!("Running database migrations...");
    run_migrations(&pool).await?;

    // Initialize services
    tracing::info!("Initializing services...");

    let session_ttl = Duration::hours(config.session_ttl_hours);
    let session_tokens = Arc::new(SessionTokens::new(&config.session_secret, session_ttl));
    let session_cookie = SessionCookie::new(session_ttl, config.cookie_secure);

    // Repositories
    let user_repo = Arc::new(SqliteUserRepository::new(pool.clone()));
    let post_repo = Arc::new(SqlitePostRepository::new(pool.clone()));

    // Application services
    let auth_service = Arc::new(AuthService::new(user_repo, session_tokens));
    let blog_service = Arc::new(BlogService::new(post_repo, config.post_offset));

    let views = Views::new()?;

    tracing::info!("Services initialized successfully");

    run_http_server(http_addr, auth_service, blog_service, session_cookie, views).await?;

    tracing::info!("Shutting down...");
    pool.close().await;
    Ok(())
}

async fn run_http_server(
    addr: String,
    auth_service: Arc<AuthService>,
    blog_service: Arc<BlogService>,
    session_cookie: SessionCookie,
    views: Views,
) -> anyhow::Result<()> {
    use actix_web::{middleware::Logger, web, App, HttpServer};

    tracing::info!("Configuring HTTP server...");

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(blog_service.clone()))
            .app_data(web::Data::new(session_cookie.clone()))
            .app_data(web::Data::new(views.clone()))
            .configure(routes::configure)
    })
    .bind(&addr)?
    .run();

    tracing::info!("HTTP server running on {}", addr);

    server.await?;

    Ok(())
}
