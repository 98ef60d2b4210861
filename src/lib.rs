pub mod application;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::list_orders,
        handlers::orders::update_status,
        handlers::orders::submit_review,
        handlers::dashboard::get_stats,
    ),
    components(schemas(
        handlers::orders::OrderItemRequest,
        handlers::orders::CreateOrderRequest,
        handlers::orders::UpdateStatusRequest,
        handlers::orders::SubmitReviewRequest,
        handlers::orders::OrderItemResponse,
        handlers::orders::OrderResponse,
        handlers::orders::ListOrdersResponse,
        handlers::dashboard::DashboardResponse,
        handlers::dashboard::StatsSummary,
        handlers::dashboard::PaymentMethodStat,
        handlers::dashboard::StatusStat,
        handlers::dashboard::DailyRevenuePoint,
        handlers::dashboard::WeeklyRevenuePoint,
        handlers::dashboard::MonthlyRevenuePoint,
        handlers::dashboard::HalfYearlyRevenuePoint,
        handlers::dashboard::TopProductEntry,
    )),
    tags(
        (name = "orders", description = "Order ingestion, status transitions and reviews"),
        (name = "dashboard", description = "Revenue and sales analytics"),
    )
)]
struct ApiDoc;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) {
    let mut conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run database migrations");
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .wrap(Logger::default())
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("", web::get().to(handlers::orders::list_orders))
                    .route("/{id}", web::get().to(handlers::orders::get_order))
                    .route("/{id}/status", web::put().to(handlers::orders::update_status))
                    .route("/{id}/review", web::post().to(handlers::orders::submit_review)),
            )
            .service(
                web::scope("/dashboard")
                    .route("/stats", web::get().to(handlers::dashboard::get_stats)),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", ApiDoc::openapi()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
