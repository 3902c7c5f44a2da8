use crate::{
    data::student::Student,
    error::{MissingStudentSnafu, Operation, RollcallError, RollcallResult, StudentOperationSnafu},
    responses::Envelope,
    state::RollcallState,
    validation::{FieldError, StudentPayload},
};
use axum::{
    Json,
    extract::{FromRequest, Path, Request, State},
    http::StatusCode,
};
use serde_json::Value;
use snafu::{OptionExt, ResultExt};

/// Pulls `{"student": {...}}` out of the body. Anything that isn't that shape
/// is a validation failure rather than axum's default 415/422.
pub struct StudentJson(pub StudentPayload);

impl<S> FromRequest<S> for StudentJson
where
    S: Send + Sync,
{
    type Rejection = RollcallError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| {
                RollcallError::validation(vec![FieldError::new("body", rejection.body_text())])
            })?;

        StudentPayload::from_body(body)
            .map(Self)
            .map_err(RollcallError::validation)
    }
}

pub async fn post_student(
    State(state): State<RollcallState>,
    StudentJson(payload): StudentJson,
) -> RollcallResult<(StatusCode, Envelope<Student>)> {
    let to_be_added = payload
        .into_new_student()
        .map_err(RollcallError::validation)?;

    let student = state
        .students()
        .insert(to_be_added)
        .await
        .context(StudentOperationSnafu {
            operation: Operation::Create,
        })?;

    info!(student_id = %student.student_id, id = %student.id, "Created student");
    Ok((
        StatusCode::CREATED,
        Envelope::success("Student created successfully", student),
    ))
}

pub async fn get_students(
    State(state): State<RollcallState>,
) -> RollcallResult<Envelope<Vec<Student>>> {
    let students = state
        .students()
        .get_all()
        .await
        .context(StudentOperationSnafu {
            operation: Operation::List,
        })?;

    Ok(Envelope::success("Students retrieved successfully", students))
}

pub async fn get_student(
    State(state): State<RollcallState>,
    Path(student_id): Path<String>,
) -> RollcallResult<Envelope<Student>> {
    let found = state
        .students()
        .get_by_student_id(&student_id)
        .await
        .context(StudentOperationSnafu {
            operation: Operation::Fetch,
        })?;
    let student = found.context(MissingStudentSnafu { student_id })?;

    Ok(Envelope::success("Student retrieved successfully", student))
}

pub async fn put_student(
    State(state): State<RollcallState>,
    Path(student_id): Path<String>,
    StudentJson(payload): StudentJson,
) -> RollcallResult<Envelope<Student>> {
    let patch = payload.into_patch().map_err(RollcallError::validation)?;

    let found = state
        .students()
        .update_by_student_id(&student_id, patch)
        .await
        .context(StudentOperationSnafu {
            operation: Operation::Update,
        })?;
    let student = found.context(MissingStudentSnafu { student_id })?;

    info!(student_id = %student.student_id, "Updated student");
    Ok(Envelope::success("Student updated successfully", student))
}

pub async fn delete_student(
    State(state): State<RollcallState>,
    Path(student_id): Path<String>,
) -> RollcallResult<Envelope<Student>> {
    let found = state
        .students()
        .remove_by_student_id(&student_id)
        .await
        .context(StudentOperationSnafu {
            operation: Operation::Delete,
        })?;
    let student = found.context(MissingStudentSnafu { student_id })?;

    info!(student_id = %student.student_id, "Deleted student");
    Ok(Envelope::success("Student deleted successfully", student))
}
