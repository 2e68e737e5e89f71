use crate::data::validation::FieldErrors;
use axum::{
    Json,
    extract::{multipart::MultipartError, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::html;
use serde_json::json;
use snafu::Snafu;
use std::{num::ParseIntError, path::PathBuf};
use uuid::Uuid;

pub type RollcallResult<T> = Result<T, RollcallError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RollcallError {
    #[snafu(display("Validation failed: {}", errors))]
    ValidationFailed { errors: FieldErrors },
    #[snafu(display("studentId {:?} must be unique", student_id))]
    DuplicateStudentId { student_id: String },
    #[snafu(display("Import rejected with {} problem(s)", problems.len()))]
    ImportRejected { problems: Vec<String> },
    #[snafu(display("Unable to find student with UUID: {}", id))]
    MissingStudent { id: Uuid },
    #[snafu(display("Unable to parse uuid {:?}", original))]
    ParseUuid {
        source: uuid::Error,
        original: String,
    },
    #[snafu(display("Error reading request body"))]
    JsonBody { source: JsonRejection },
    #[snafu(display("Error reading student store at {}", path.display()))]
    ReadStore {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Error writing student store at {}", path.display()))]
    WriteStore {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Error creating data directory {}", path.display()))]
    CreateDataDir {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Student store at {} is not a valid JSON array of students", path.display()))]
    ParseStore {
        source: serde_json::Error,
        path: PathBuf,
    },
    #[snafu(display("Error serialising students"))]
    SerialiseStore { source: serde_json::Error },
    #[snafu(display("Error with CSVs"))]
    Csv { source: csv::Error },
    #[snafu(display("Error flushing CSV output"))]
    CsvFlush { source: std::io::Error },
    #[snafu(display("Error with multipart form input"))]
    Multipart { source: MultipartError },
    #[snafu(display("Unable to retrieve env var `{}`", name))]
    BadEnvVar {
        source: dotenvy::Error,
        name: &'static str,
    },
    #[snafu(display("Unable to parse env var `{}` as a number", name))]
    ParseEnvVar {
        source: ParseIntError,
        name: &'static str,
    },
    #[snafu(display("Unable to listen on {}", address))]
    BindListener {
        source: std::io::Error,
        address: String,
    },
    #[snafu(display("Error serving app"))]
    Serve { source: std::io::Error },
}

impl RollcallError {
    pub fn status_code(&self) -> StatusCode {
        const ISE: StatusCode = StatusCode::INTERNAL_SERVER_ERROR; //internal server error
        const NF: StatusCode = StatusCode::NOT_FOUND; //not found
        const BI: StatusCode = StatusCode::BAD_REQUEST; //bad input

        match self {
            Self::ValidationFailed { .. } | Self::DuplicateStudentId { .. } => BI,
            Self::ImportRejected { .. } => BI,
            Self::MissingStudent { .. } => NF,
            Self::ParseUuid { .. } | Self::JsonBody { .. } => BI,
            Self::ReadStore { .. } | Self::WriteStore { .. } | Self::CreateDataDir { .. } => ISE,
            Self::ParseStore { .. } | Self::SerialiseStore { .. } => ISE,
            Self::Csv { .. } => BI,
            Self::CsvFlush { .. } => ISE,
            Self::Multipart { source } => source.status(),
            Self::BadEnvVar { .. } | Self::ParseEnvVar { .. } => ISE,
            Self::BindListener { .. } | Self::Serve { .. } => ISE,
        }
    }

    /// Human-readable messages safe to hand back to a client.
    ///
    /// Server-side faults collapse to a generic message; the detail only goes to the log.
    pub fn client_messages(&self) -> Vec<String> {
        match self {
            Self::ValidationFailed { errors } => errors.messages().collect(),
            Self::ImportRejected { problems } => problems.clone(),
            _ if self.status_code().is_server_error() => vec!["Server Error".to_string()],
            Self::JsonBody { source } => vec![source.body_text()],
            _ => vec![self.to_string()],
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            Self::ValidationFailed { .. } => "Validation failed",
            Self::DuplicateStudentId { .. } | Self::ImportRejected { .. } => "Validation error",
            Self::MissingStudent { .. } => "Not found",
            _ if self.status_code().is_server_error() => "An error occurred",
            _ => "Bad request",
        }
    }
}

impl IntoResponse for RollcallError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            error!(?self, "Error!");
        } else {
            warn!(%self, "Rejected request");
        }

        let mut messages = self.client_messages();
        let error = match &self {
            Self::ValidationFailed { .. } | Self::ImportRejected { .. } => json!(messages),
            _ => json!(messages.pop().unwrap_or_default()),
        };

        let body = json!({
            "success": false,
            "error": error,
            "message": self.summary(),
        });
        (status_code, Json(body)).into_response()
    }
}

/// Wraps errors coming out of the htmx fragment routes, which want markup rather than JSON.
#[derive(Debug)]
pub struct HtmlError(pub RollcallError);

pub type HtmlResult<T> = Result<T, HtmlError>;

impl From<RollcallError> for HtmlError {
    fn from(value: RollcallError) -> Self {
        Self(value)
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        let Self(inner) = self;
        let status_code = inner.status_code();
        if status_code.is_server_error() {
            error!(?inner, "Error!");
        }

        let markup = html! {
            div class="bg-red-100 border border-red-400 text-red-700 px-4 py-3 rounded relative mb-4" role="alert" {
                strong class="font-bold" {"Rollcall Error "}
                @for message in inner.client_messages() {
                    span class="block" {(message)}
                }
            }
        };
        (status_code, Html(markup.into_string())).into_response()
    }
}
