pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;
pub mod state;

use std::error::Error;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::Config;
pub use db::{create_pool, DbPool, PoolSettings};
pub use state::AppState;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("Applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server. Carts live in `state`, so every worker must share it.
pub fn build_server(
    state: web::Data<AppState>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let openapi = handlers::ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .route("/health", web::get().to(handlers::health))
            .service(
                web::scope("/categories")
                    .route("", web::get().to(handlers::medications::list_categories))
                    .route("", web::post().to(handlers::medications::create_category)),
            )
            .service(
                web::scope("/medications")
                    .route("", web::get().to(handlers::medications::list_medications))
                    .route("", web::post().to(handlers::medications::create_medication))
                    .route("/search", web::get().to(handlers::medications::search_medications))
                    .route("/{id}", web::get().to(handlers::medications::get_medication))
                    .route("/{id}", web::patch().to(handlers::medications::update_medication)),
            )
            .service(
                web::scope("/carts")
                    .route("/items", web::post().to(handlers::carts::add_product))
                    .route("/{id}", web::get().to(handlers::carts::get_cart))
                    .route("/{id}", web::delete().to(handlers::carts::cancel_cart))
                    .route(
                        "/{id}/items/{line_id}",
                        web::delete().to(handlers::carts::remove_product),
                    )
                    .route("/{id}/checkout", web::post().to(handlers::carts::checkout)),
            )
            .service(
                web::scope("/sales")
                    .route("", web::get().to(handlers::sales::list_sales))
                    .route("/{id}", web::get().to(handlers::sales::get_sale)),
            )
            .route("/dashboard", web::get().to(handlers::dashboard::get_dashboard))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
