//! Request/response bodies and the error-to-status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::membership::MembershipError;

#[derive(Debug, Deserialize)]
pub struct SubmitApplicationRequest {
    pub user_id: String,
    /// Decimal amount, e.g. `"25.00"`.
    pub fee: String,
    pub statement: String,
}

#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    pub id: String,
    pub status: String,
    pub fee: String,
}

#[derive(Debug, Deserialize)]
pub struct StartRedirectFlowRequest {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct RedirectFlowResponse {
    pub redirect_url: String,
}

/// Query parameters the gateway appends to the success redirect.
#[derive(Debug, Deserialize)]
pub struct CompleteRedirectFlowQuery {
    pub redirect_flow_id: String,
    pub session_token: String,
}

#[derive(Debug, Serialize)]
pub struct MandateResponse {
    pub mandate_id: String,
    pub status: String,
    /// Whether the approval request email went out.
    pub approval_requested: bool,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub application_id: String,
    pub status: String,
    pub payment_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// API error: a status code plus a deliberately terse message.
///
/// Not-found responses never say whether the token or the record was
/// the problem, so the approval links cannot be probed.
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "not found")
    }
}

impl From<MembershipError> for ApiError {
    fn from(err: MembershipError) -> Self {
        match &err {
            MembershipError::ApplicationNotFound | MembershipError::UserNotFound => {
                Self::not_found()
            }
            MembershipError::AlreadyDecided { status } => Self::new(
                StatusCode::CONFLICT,
                format!("application already {status}"),
            ),
            MembershipError::InactiveMandate { .. } => {
                Self::new(StatusCode::CONFLICT, err.to_string())
            }
            MembershipError::FeeBelowMinimum { .. } => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            MembershipError::GatewayUnavailable { .. }
            | MembershipError::GatewayRejected { .. } => Self::new(
                StatusCode::BAD_GATEWAY,
                "payment provider request failed",
            ),
            MembershipError::Validation(err) => Self::bad_request(err.to_string()),
            MembershipError::Storage(_) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{Fee, MandateId};
    use crate::domain::membership::ApplicationStatus;

    fn status_of(err: MembershipError) -> StatusCode {
        ApiError::from(err).status
    }

    #[test]
    fn lookup_failures_are_indistinguishable_not_found() {
        assert_eq!(
            status_of(MembershipError::ApplicationNotFound),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(MembershipError::UserNotFound),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn gateway_problems_are_bad_gateway() {
        assert_eq!(
            status_of(MembershipError::GatewayUnavailable {
                message: "timeout".to_string()
            }),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn conflicts_and_validation_map_distinctly() {
        assert_eq!(
            status_of(MembershipError::AlreadyDecided {
                status: ApplicationStatus::Approved
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(MembershipError::InactiveMandate {
                mandate_id: MandateId::new("MD0001").unwrap()
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(MembershipError::FeeBelowMinimum {
                minimum: Fee::MINIMUM,
                given: Fee::from_pence(500).unwrap()
            }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
