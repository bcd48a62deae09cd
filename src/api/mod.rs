use axum::Json;
use axum::body::Bytes;
use axum::extract::Path;
use axum::routing::post;
use axum::{Router, extract::State, http::StatusCode, routing::get};
use serde::de::DeserializeOwned;

use crate::db::repository;
use crate::error::AppError;
use crate::models::*;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_courses))
        .route("/health", get(health))
        .route("/api/courses/", get(list_courses).post(create_course))
        .route("/api/courses/{id}/", get(get_course).delete(delete_course))
        .route("/api/courses/{id}/add/", post(add_user_to_course))
        .route("/api/courses/{id}/assignment/", post(add_assignment_to_course))
        .route("/api/users/", post(create_user))
        .route("/api/users/{id}/", get(get_user))
        .with_state(state)
}

/// One explicit deserialization step per body-carrying endpoint. Bodies
/// are taken as raw bytes so handlers control when parsing happens
/// relative to their path lookups.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, AppError> {
    serde_json::from_slice(body)
        .map_err(|err| AppError::BadRequest(format!("invalid request body: {err}")))
}

async fn health(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(StatusCode::OK)
}

async fn list_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseDetail>>, AppError> {
    let courses = repository::fetch_courses(&state.db).await?;
    let mut details = Vec::with_capacity(courses.len());
    for course in courses {
        details.push(repository::load_course_detail(&state.db, course).await?);
    }
    Ok(Json(details))
}

async fn create_course(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CourseDetail>), AppError> {
    let req: NewCourseRequest = parse_body(&body)?;
    let course = repository::insert_course(&state.db, req).await?;
    let detail = repository::load_course_detail(&state.db, course).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn get_course(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> Result<Json<CourseDetail>, AppError> {
    let course = repository::find_course_by_id(&state.db, course_id)
        .await?
        .ok_or_else(AppError::course_not_found)?;
    let detail = repository::load_course_detail(&state.db, course).await?;
    Ok(Json(detail))
}

/// Responds with the course as it was before removal.
async fn delete_course(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
) -> Result<Json<CourseDetail>, AppError> {
    let course = repository::find_course_by_id(&state.db, course_id)
        .await?
        .ok_or_else(AppError::course_not_found)?;
    let detail = repository::load_course_detail(&state.db, course).await?;
    repository::delete_course(&state.db, course_id).await?;
    Ok(Json(detail))
}

async fn create_user(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<UserDetail>), AppError> {
    let req: NewUserRequest = parse_body(&body)?;
    let user = repository::insert_user(&state.db, req).await?;
    let detail = repository::load_user_detail(&state.db, user).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserDetail>, AppError> {
    let user = repository::find_user_by_id(&state.db, user_id)
        .await?
        .ok_or_else(AppError::user_not_found)?;
    let detail = repository::load_user_detail(&state.db, user).await?;
    Ok(Json(detail))
}

/// Course existence is checked before the body is parsed, field presence
/// before the user lookup, and the role value last. When several of these
/// fail at once, the earlier check decides the response.
async fn add_user_to_course(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
    body: Bytes,
) -> Result<Json<CourseDetail>, AppError> {
    let course = repository::find_course_by_id(&state.db, course_id)
        .await?
        .ok_or_else(AppError::course_not_found)?;

    let req: EnrollRequest = parse_body(&body)?;

    let user = repository::find_user_by_id(&state.db, req.user_id)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    let role = Role::parse(&req.role)
        .ok_or_else(|| AppError::BadRequest(format!("unknown enrollment type: {}", req.role)))?;

    repository::enroll_user(&state.db, course.id, user.id, role).await?;

    let detail = repository::load_course_detail(&state.db, course).await?;
    Ok(Json(detail))
}

async fn add_assignment_to_course(
    State(state): State<AppState>,
    Path(course_id): Path<i64>,
    body: Bytes,
) -> Result<(StatusCode, Json<Assignment>), AppError> {
    let course = repository::find_course_by_id(&state.db, course_id)
        .await?
        .ok_or_else(AppError::course_not_found)?;

    let req: NewAssignmentRequest = parse_body(&body)?;

    let assignment = repository::insert_assignment(&state.db, course.id, req).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}
