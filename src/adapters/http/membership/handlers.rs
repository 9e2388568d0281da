//! Axum handlers for the membership API.

use std::str::FromStr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::adapters::gocardless::WebhookSignatureVerifier;
use crate::application::billing::{
    CancelMandateHandler, ChargeMandateHandler, ProcessMandateEventHandler,
    ProcessPaymentEventHandler, ProcessWebhookBatchHandler,
};
use crate::application::membership::{
    CompleteRedirectFlowCommand, CompleteRedirectFlowHandler, DecideApplicationCommand,
    DecideApplicationHandler, Decision, RequestApprovalHandler, StartRedirectFlowHandler,
    SubmitApplicationCommand, SubmitApplicationHandler,
};
use crate::application::PublicUrls;
use crate::domain::foundation::{Fee, SessionToken, UserId};
use crate::ports::{
    ApplicationRepository, Mailer, MandateRepository, PaymentGateway, PaymentRepository,
    UserDirectory, WebhookBatch,
};

use super::dto::*;

/// Status the gateway expects for a signature rejection.
const INVALID_TOKEN: u16 = 498;

/// Shared state for the HTTP surface: the ports plus the webhook
/// verifier and public URL builder.
#[derive(Clone)]
pub struct AppState {
    pub applications: Arc<dyn ApplicationRepository>,
    pub mandates: Arc<dyn MandateRepository>,
    pub payments: Arc<dyn PaymentRepository>,
    pub users: Arc<dyn UserDirectory>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub mailer: Arc<dyn Mailer>,
    pub webhook_verifier: Arc<WebhookSignatureVerifier>,
    pub urls: PublicUrls,
}

// ═══════════════════════════════════════════════════════════════════════
// Application intake
// ═══════════════════════════════════════════════════════════════════════

pub async fn submit_application(
    State(state): State<AppState>,
    Json(request): Json<SubmitApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationResponse>), ApiError> {
    let user_id = UserId::from_str(&request.user_id)
        .map_err(|_| ApiError::bad_request("user_id is not a UUID"))?;
    let fee = Fee::parse(&request.fee).map_err(|err| ApiError::bad_request(err.to_string()))?;

    let handler = SubmitApplicationHandler::new(state.applications.clone());
    let application = handler
        .handle(SubmitApplicationCommand {
            user_id,
            fee,
            statement: request.statement,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse {
            id: application.id.to_string(),
            status: application.status.to_string(),
            fee: application.fee.to_string(),
        }),
    ))
}

// ═══════════════════════════════════════════════════════════════════════
// Mandate setup (redirect flow)
// ═══════════════════════════════════════════════════════════════════════

pub async fn start_redirect_flow(
    State(state): State<AppState>,
    Json(request): Json<StartRedirectFlowRequest>,
) -> Result<Json<RedirectFlowResponse>, ApiError> {
    let user_id = UserId::from_str(&request.user_id)
        .map_err(|_| ApiError::bad_request("user_id is not a UUID"))?;

    let handler = StartRedirectFlowHandler::new(
        state.applications.clone(),
        state.users.clone(),
        state.gateway.clone(),
        state.urls.clone(),
    );
    let redirect_url = handler.handle(&user_id).await?;

    Ok(Json(RedirectFlowResponse { redirect_url }))
}

pub async fn complete_redirect_flow(
    State(state): State<AppState>,
    Query(query): Query<CompleteRedirectFlowQuery>,
) -> Result<Json<MandateResponse>, ApiError> {
    let session_token = SessionToken::parse(&query.session_token)
        .map_err(|err| ApiError::bad_request(err.to_string()))?;

    let handler = CompleteRedirectFlowHandler::new(
        state.applications.clone(),
        state.mandates.clone(),
        state.gateway.clone(),
    );
    let mandate = handler
        .handle(CompleteRedirectFlowCommand {
            redirect_flow_id: query.redirect_flow_id,
            session_token: session_token.clone(),
        })
        .await?;

    // The mandate is safely stored; a failed approval email must not
    // turn the payer's success redirect into an error page.
    let approval_requested = request_approval(&state, &session_token).await;

    Ok(Json(MandateResponse {
        mandate_id: mandate.id.to_string(),
        status: mandate.status.to_string(),
        approval_requested,
    }))
}

async fn request_approval(state: &AppState, session_token: &SessionToken) -> bool {
    let handler = RequestApprovalHandler::new(
        state.applications.clone(),
        state.users.clone(),
        state.mailer.clone(),
        state.urls.clone(),
    );
    let application = match state.applications.find_by_session_token(session_token).await {
        Ok(Some(application)) => application,
        Ok(None) => return false,
        Err(err) => {
            tracing::error!(error = %err, "application reload for approval request failed");
            return false;
        }
    };
    let mut application = application;
    match handler.handle(&mut application).await {
        Ok(sent) => sent,
        Err(err) => {
            tracing::error!(
                application_id = %application.id,
                error = %err,
                "approval request failed"
            );
            false
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Approval links
// ═══════════════════════════════════════════════════════════════════════

pub async fn decide_application(
    State(state): State<AppState>,
    Path((session_token, action)): Path<(String, String)>,
) -> Result<Json<DecisionResponse>, ApiError> {
    let session_token = SessionToken::parse(&session_token).map_err(|_| ApiError::not_found())?;
    let decision =
        Decision::from_str(&action).map_err(|_| ApiError::bad_request("unknown action"))?;

    let handler = DecideApplicationHandler::new(
        state.applications.clone(),
        state.mandates.clone(),
        state.users.clone(),
        state.mailer.clone(),
        ChargeMandateHandler::new(state.gateway.clone(), state.payments.clone()),
        CancelMandateHandler::new(state.gateway.clone(), state.mandates.clone()),
    );
    let outcome = handler
        .handle(DecideApplicationCommand {
            session_token,
            decision,
        })
        .await?;

    Ok(Json(DecisionResponse {
        application_id: outcome.application.id.to_string(),
        status: outcome.application.status.to_string(),
        payment_id: outcome.payment.map(|payment| payment.id.to_string()),
    }))
}

// ═══════════════════════════════════════════════════════════════════════
// Webhooks
// ═══════════════════════════════════════════════════════════════════════

pub async fn gocardless_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get("Webhook-Signature")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if let Err(err) = state.webhook_verifier.verify(&body, signature) {
        tracing::warn!(error = %err, "webhook rejected");
        let status = StatusCode::from_u16(INVALID_TOKEN).expect("498 is a valid status code");
        return (status, "invalid signature").into_response();
    }

    let batch: WebhookBatch = match serde_json::from_slice(&body) {
        Ok(batch) => batch,
        Err(err) => {
            tracing::warn!(error = %err, "webhook body failed to parse");
            return (StatusCode::BAD_REQUEST, "malformed body").into_response();
        }
    };

    let handler = ProcessWebhookBatchHandler::new(
        ProcessPaymentEventHandler::new(
            state.gateway.clone(),
            state.payments.clone(),
            state.mandates.clone(),
            state.applications.clone(),
        ),
        ProcessMandateEventHandler::new(state.gateway.clone(), state.mandates.clone()),
    );
    let trace = handler.handle(&batch).await;

    (StatusCode::OK, trace).into_response()
}
