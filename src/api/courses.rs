use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use axum_extra::extract::WithRejection;

use crate::errors::AppError;
use crate::models::{Course, CourseQuery, CreateCourse, UpdateCourse};
use crate::services::CourseService;

#[derive(Clone)]
pub struct CoursesAppState {
    pub course_service: CourseService,
}

/// Course endpoints, served both with and without the trailing slash.
pub fn courses_routes(course_service: CourseService) -> Router {
    let shared_state = CoursesAppState { course_service };

    Router::new()
        .route("/courses", get(list_courses).post(create_course))
        .route("/courses/", get(list_courses).post(create_course))
        .route(
            "/courses/:course_id",
            get(get_course)
                .put(replace_course)
                .patch(update_course)
                .delete(delete_course),
        )
        .route(
            "/courses/:course_id/",
            get(get_course)
                .put(replace_course)
                .patch(update_course)
                .delete(delete_course),
        )
        .with_state(shared_state)
}

/// List courses, optionally narrowed by exact `id` and/or `name`
pub async fn list_courses(
    State(state): State<CoursesAppState>,
    WithRejection(Query(query), _): WithRejection<Query<CourseQuery>, AppError>,
) -> Result<Json<Vec<Course>>, AppError> {
    let courses = state.course_service.list_courses(&query).await?;
    tracing::debug!("Listed {} courses for {:?}", courses.len(), query);
    Ok(Json(courses))
}

pub async fn get_course(
    State(state): State<CoursesAppState>,
    WithRejection(Path(course_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<Json<Course>, AppError> {
    let course = state.course_service.get_course(course_id).await?;
    Ok(Json(course))
}

pub async fn create_course(
    State(state): State<CoursesAppState>,
    WithRejection(Json(request), _): WithRejection<Json<CreateCourse>, AppError>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let course = state.course_service.create_course(request).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn replace_course(
    State(state): State<CoursesAppState>,
    WithRejection(Path(course_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<CreateCourse>, AppError>,
) -> Result<Json<Course>, AppError> {
    let course = state.course_service.replace_course(course_id, request).await?;
    Ok(Json(course))
}

pub async fn update_course(
    State(state): State<CoursesAppState>,
    WithRejection(Path(course_id), _): WithRejection<Path<i64>, AppError>,
    WithRejection(Json(request), _): WithRejection<Json<UpdateCourse>, AppError>,
) -> Result<Json<Course>, AppError> {
    let course = state.course_service.update_course(course_id, request).await?;
    Ok(Json(course))
}

pub async fn delete_course(
    State(state): State<CoursesAppState>,
    WithRejection(Path(course_id), _): WithRejection<Path<i64>, AppError>,
) -> Result<StatusCode, AppError> {
    state.course_service.delete_course(course_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
