use axum::{routing::get, Router};
use sqlx::SqlitePool;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::courses::courses_routes;
use super::health::health_check;
use super::middleware::{cors_layer, security_headers_layer};
use crate::config::AppConfig;
use crate::services::CourseService;

pub fn create_routes(db: SqlitePool, config: &AppConfig) -> Router {
    let course_service = CourseService::new(db.clone(), config.max_students_per_course);

    let api_v1 = Router::new().merge(courses_routes(course_service));

    let health = Router::new()
        .route("/health", get(health_check))
        .with_state(db);

    Router::new()
        .merge(health)
        .nest("/api/v1", api_v1)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(security_headers_layer())
                .layer(cors_layer()),
        )
}
