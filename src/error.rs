use crate::{
    responses::{Envelope, ErrorDetail},
    validation::FieldError,
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use snafu::Snafu;
use std::{fmt, net::SocketAddr, num::ParseIntError};

pub type RollcallResult<T> = Result<T, RollcallError>;

/// The store call a handler was making when it failed. Only used to pick
/// the envelope message for a 500.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    List,
    Fetch,
    Update,
    Delete,
}

impl Operation {
    pub const fn failure_message(self) -> &'static str {
        match self {
            Self::Create => "Failed to create student",
            Self::List => "Failed to retrieve students",
            Self::Fetch => "Failed to retrieve student",
            Self::Update => "Failed to update student",
            Self::Delete => "Failed to delete student",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Create => "create",
            Self::List => "list",
            Self::Fetch => "fetch",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RollcallError {
    #[snafu(display("Error opening database"))]
    OpenDatabase { source: sqlx::Error },
    #[snafu(display("Error getting db connection: {source}"))]
    GetDatabaseConnection { source: sqlx::Error },
    #[snafu(display("Error making SQL query: {source}"))]
    MakeQuery { source: sqlx::Error },
    #[snafu(display("Error migrating DB schema"))]
    MigrateError { source: sqlx::migrate::MigrateError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse port {:?}", original))]
    ParsePort {
        source: ParseIntError,
        original: String,
    },
    #[snafu(display("Unable to parse max connections {:?}", original))]
    ParseMaxConnections {
        source: ParseIntError,
        original: String,
    },
    #[snafu(display("Unable to parse server address {:?}", original))]
    ParseServerAddress {
        source: std::net::AddrParseError,
        original: String,
    },
    #[snafu(display("Unable to listen on {}", address))]
    BindListener {
        source: std::io::Error,
        address: SocketAddr,
    },
    #[snafu(display("Error serving app"))]
    Serve { source: std::io::Error },
    #[snafu(display("A student with this {} already exists", field))]
    DuplicateStudent { field: &'static str },
    #[snafu(display("Validation failed with {} error(s)", errors.len()))]
    Validation { errors: Vec<FieldError> },
    #[snafu(display("Student with id {} not found", student_id))]
    MissingStudent { student_id: String },
    #[snafu(display("Unable to {} student(s): {}", operation, source))]
    StudentOperation {
        operation: Operation,
        #[snafu(source(from(RollcallError, Box::new)))]
        source: Box<RollcallError>,
    },
}

impl RollcallError {
    #[allow(clippy::match_same_arms)]
    pub fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        match self {
            Self::OpenDatabase { .. } | Self::GetDatabaseConnection { .. } => ISE,
            Self::MakeQuery { .. } | Self::MigrateError { .. } => ISE,
            Self::BadEnvVar { .. } => ISE,
            Self::ParsePort { .. } | Self::ParseMaxConnections { .. } => ISE,
            Self::ParseServerAddress { .. } => ISE,
            Self::BindListener { .. } | Self::Serve { .. } => ISE,
            Self::DuplicateStudent { .. } => ISE,
            Self::Validation { .. } => BI,
            Self::MissingStudent { .. } => NF,
            Self::StudentOperation { .. } => ISE,
        }
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::Validation { errors }
    }
}

impl IntoResponse for RollcallError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            error!(?self, "Error!");
        } else {
            debug!(?self, "Rejected request");
        }

        let envelope = match self {
            Self::Validation { errors } => {
                Envelope::failure("Validation failed", Some(ErrorDetail::Fields(errors)))
            }
            Self::MissingStudent { student_id } => {
                Envelope::failure(format!("Student with id {student_id} not found"), None)
            }
            Self::StudentOperation { operation, source } => Envelope::failure(
                operation.failure_message(),
                Some(ErrorDetail::Message(source.to_string())),
            ),
            other => Envelope::failure(
                "Internal server error",
                Some(ErrorDetail::Message(other.to_string())),
            ),
        };

        (status_code, envelope).into_response()
    }
}
