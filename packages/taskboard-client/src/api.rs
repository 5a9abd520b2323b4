/// Wire types for the project-management REST API.
///
/// Every response is wrapped in `{ success, data?, error?, pagination? }`.
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use taskboard_core::{AuthorityError, TaskStatus};

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiErrorBody>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
}

/// Body of `PUT /api/tasks/{taskId}` for a status change.
#[derive(Debug, Serialize)]
pub struct StatusUpdate {
    pub status: TaskStatus,
}

/// Map a failed response onto the authority error taxonomy. The API error
/// code wins over the HTTP status when both are present.
pub fn classify(status: StatusCode, error: Option<&ApiErrorBody>) -> AuthorityError {
    let message = match error {
        Some(body) if body.message.is_empty() => body.code.clone(),
        Some(body) => format!("{} ({})", body.message, body.code),
        None => format!("HTTP {}", status),
    };

    match error.map(|body| body.code.as_str()) {
        Some("AUTHENTICATION_ERROR") => return AuthorityError::AuthorityUnavailable(message),
        Some("VALIDATION_ERROR" | "TASK_NOT_FOUND" | "PROJECT_NOT_FOUND" | "INVALID_ASSIGNEE") => {
            return AuthorityError::AuthorityRejected(message)
        }
        Some("DATABASE_ERROR" | "INTERNAL_ERROR") => return AuthorityError::NetworkFailure(message),
        _ => {}
    }

    match status.as_u16() {
        401 | 403 => AuthorityError::AuthorityUnavailable(message),
        400 | 404 | 409 | 422 => AuthorityError::AuthorityRejected(message),
        // a 2xx that still says `success: false`
        _ if status.is_success() => AuthorityError::AuthorityRejected(message),
        _ => AuthorityError::NetworkFailure(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(code: &str) -> ApiErrorBody {
        ApiErrorBody {
            code: code.to_string(),
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_classify_by_code() {
        assert!(matches!(
            classify(StatusCode::UNAUTHORIZED, Some(&body("AUTHENTICATION_ERROR"))),
            AuthorityError::AuthorityUnavailable(_)
        ));
        assert!(matches!(
            classify(StatusCode::NOT_FOUND, Some(&body("TASK_NOT_FOUND"))),
            AuthorityError::AuthorityRejected(_)
        ));
        assert!(matches!(
            classify(StatusCode::INTERNAL_SERVER_ERROR, Some(&body("DATABASE_ERROR"))),
            AuthorityError::NetworkFailure(_)
        ));
    }

    #[test]
    fn test_classify_by_status() {
        assert!(matches!(
            classify(StatusCode::FORBIDDEN, None),
            AuthorityError::AuthorityUnavailable(_)
        ));
        assert!(matches!(
            classify(StatusCode::UNPROCESSABLE_ENTITY, None),
            AuthorityError::AuthorityRejected(_)
        ));
        assert!(matches!(
            classify(StatusCode::BAD_GATEWAY, None),
            AuthorityError::NetworkFailure(_)
        ));
        assert!(matches!(
            classify(StatusCode::OK, Some(&body("SOMETHING_NEW"))),
            AuthorityError::AuthorityRejected(_)
        ));
    }

    #[test]
    fn test_classify_message() {
        assert_eq!(
            classify(StatusCode::NOT_FOUND, Some(&body("TASK_NOT_FOUND"))),
            AuthorityError::AuthorityRejected("boom (TASK_NOT_FOUND)".to_string())
        );
        assert_eq!(
            classify(StatusCode::SERVICE_UNAVAILABLE, None),
            AuthorityError::NetworkFailure("HTTP 503 Service Unavailable".to_string())
        );
    }

    #[test]
    fn test_envelope_parses_pagination() {
        let json = r#"{"success":true,"data":[],"pagination":{"page":1,"limit":50,"total":0,"totalPages":0}}"#;
        let envelope: ApiEnvelope<Vec<serde_json::Value>> = serde_json::from_str(json).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.pagination.unwrap().total_pages, 0);
    }

    #[test]
    fn test_status_update_body() {
        let json = serde_json::to_value(StatusUpdate {
            status: TaskStatus::Done,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "status": "DONE" }));
    }
}
