//! Axum route handlers for the assignment query API.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::assignment::{RoomAssignments, Side};
use crate::models::exam::{ExamDuration, ExamTime};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExamTimeQuery {
    pub toe: String,
}

#[derive(Debug, Serialize)]
pub struct TimeAssignmentsResponse {
    pub toe: ExamTime,
    pub assignments: Vec<RoomAssignments>,
}

#[derive(Debug, Serialize)]
pub struct StudentSeatResponse {
    pub student_id: String,
    pub room_number: String,
    pub row: u32,
    pub column: u32,
    pub side: Side,
    pub toe: ExamTime,
    pub doe: ExamDuration,
    pub details: String,
    /// Present when the loaded catalog knows which block holds the room.
    pub block: Option<String>,
}

/// GET /api/v1/exams/assignments?toe=
pub async fn handle_assignments_by_time(
    State(state): State<AppState>,
    params: Result<Query<ExamTimeQuery>, QueryRejection>,
) -> Result<Json<TimeAssignmentsResponse>, AppError> {
    let Query(params) = params?;
    let toe = ExamTime::parse(&params.toe)?;
    let assignments = state.query().find_by_time(&toe).await?;
    Ok(Json(TimeAssignmentsResponse { toe, assignments }))
}

/// GET /api/v1/exams/students/:student_id?toe=
pub async fn handle_student_assignment(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    params: Result<Query<ExamTimeQuery>, QueryRejection>,
) -> Result<Json<StudentSeatResponse>, AppError> {
    let Query(params) = params?;
    let toe = ExamTime::parse(&params.toe)?;
    let seat = state.query().find_student(&student_id, &toe).await?;

    let details = seat.details();
    let block = state
        .catalog
        .block_of_room(&seat.room_number)
        .map(str::to_string);
    let assignment = seat.assignment;
    Ok(Json(StudentSeatResponse {
        student_id: assignment.student_id,
        room_number: seat.room_number,
        row: assignment.row,
        column: assignment.column,
        side: assignment.side,
        toe: assignment.toe,
        doe: assignment.doe,
        details,
        block,
    }))
}

/// GET /api/v1/exams/chart?toe=
///
/// Renders every room seated at `toe` as a printable chart.
pub async fn handle_seating_chart(
    State(state): State<AppState>,
    params: Result<Query<ExamTimeQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(params) = params?;
    let toe = ExamTime::parse(&params.toe)?;
    let rooms = state.query().find_by_time(&toe).await?;
    let chart = state.renderer.render(&rooms)?;
    Ok(([(header::CONTENT_TYPE, chart.content_type)], chart.body).into_response())
}
