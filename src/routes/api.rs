use crate::{
    data::{
        parse_id,
        student::{Student, StudentDraft},
    },
    error::{JsonBodySnafu, RollcallResult},
    state::RollcallState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;
use snafu::ResultExt;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: &'static str,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: &'static str) -> Json<Self> {
        Json(Self {
            success: true,
            data,
            message,
        })
    }
}

type ApiResult<T> = RollcallResult<Json<ApiResponse<T>>>;

pub async fn get_students(State(state): State<RollcallState>) -> ApiResult<Vec<Student>> {
    let students = state.list().await?;
    Ok(ApiResponse::ok(students, "Students retrieved"))
}

pub async fn get_student(
    State(state): State<RollcallState>,
    Path(id): Path<String>,
) -> ApiResult<Student> {
    let student = state.get(parse_id(&id)?).await?;
    Ok(ApiResponse::ok(student, "Student retrieved"))
}

pub async fn post_student(
    State(state): State<RollcallState>,
    body: Result<Json<StudentDraft>, JsonRejection>,
) -> RollcallResult<(StatusCode, Json<ApiResponse<Student>>)> {
    let Json(draft) = body.context(JsonBodySnafu)?;
    let student = state.create(&draft).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(student, "Student created"),
    ))
}

pub async fn put_student(
    State(state): State<RollcallState>,
    Path(id): Path<String>,
    body: Result<Json<StudentDraft>, JsonRejection>,
) -> ApiResult<Student> {
    let id = parse_id(&id)?;
    let Json(patch) = body.context(JsonBodySnafu)?;
    let student = state.update(id, patch).await?;
    Ok(ApiResponse::ok(student, "Student updated"))
}

pub async fn delete_student(
    State(state): State<RollcallState>,
    Path(id): Path<String>,
) -> ApiResult<Student> {
    let student = state.delete(parse_id(&id)?).await?;
    Ok(ApiResponse::ok(student, "Student deleted"))
}
