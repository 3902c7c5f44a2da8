//! The JSON envelope every endpoint answers with.

use crate::validation::FieldError;
use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::borrow::Cow;

/// `{success, message, data | error}`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub message: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Fields(Vec<FieldError>),
}

impl<T: Serialize> Envelope<T> {
    pub fn success(message: impl Into<Cow<'static, str>>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
        }
    }
}

impl Envelope<()> {
    pub fn failure(message: impl Into<Cow<'static, str>>, error: Option<ErrorDetail>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
            error,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_omits_error() {
        let value = serde_json::to_value(Envelope::success("ok", 3)).unwrap();
        assert_eq!(value, json!({"success": true, "message": "ok", "data": 3}));
    }

    #[test]
    fn field_errors_serialise_as_a_list() {
        let envelope = Envelope::failure(
            "Validation failed",
            Some(ErrorDetail::Fields(vec![FieldError::new(
                "name.firstName",
                "First name is required",
            )])),
        );
        let value = serde_json::to_value(envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "message": "Validation failed",
                "error": [{"path": "name.firstName", "message": "First name is required"}]
            })
        );
    }

    #[test]
    fn not_found_has_neither_data_nor_error() {
        let value =
            serde_json::to_value(Envelope::failure("Student with id x not found", None)).unwrap();
        assert_eq!(
            value,
            json!({"success": false, "message": "Student with id x not found"})
        );
    }
}
