// HTTP error responses for the shell
//
// Every route error renders as a full HTML page carrying the notices that are
// still active, with a status code derived from the launcher error.

use super::views;
use crate::error::LauncherError;
use crate::notice::Notice;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

#[derive(Debug)]
pub struct ShellError {
    status: StatusCode,
    message: String,
    notices: Vec<Notice>,
}

impl ShellError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            notices: Vec::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn with_notices(mut self, notices: Vec<Notice>) -> Self {
        self.notices = notices;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ShellError {
    fn into_response(self) -> Response {
        let body = views::page("Error", &self.notices, &views::error_body(&self.message));
        (self.status, Html(body)).into_response()
    }
}

impl From<LauncherError> for ShellError {
    fn from(err: LauncherError) -> Self {
        let status = match &err {
            LauncherError::AppNotFound(_) => StatusCode::NOT_FOUND,
            LauncherError::UnknownAction { .. } | LauncherError::ValidationError(_) => {
                StatusCode::BAD_REQUEST
            }
            LauncherError::ActionBusy { .. } | LauncherError::DuplicateApp(_) => {
                StatusCode::CONFLICT
            }
            LauncherError::PathError(_) => StatusCode::BAD_REQUEST,
            LauncherError::LlmError(_) | LauncherError::ReqwestError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err: ShellError = LauncherError::AppNotFound("x".to_string()).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);

        let err: ShellError = LauncherError::ActionBusy {
            app_id: "a".to_string(),
            action: "b".to_string(),
        }
        .into();
        assert_eq!(err.status(), StatusCode::CONFLICT);

        let err: ShellError = LauncherError::StoreError("denied".to_string()).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_renders_html_page() {
        let response = ShellError::bad_request("missing action").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
