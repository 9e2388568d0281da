//! HTTP client for the GoCardless API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

use crate::config::GoCardlessConfig;
use crate::domain::billing::{MandateDetail, MandateStatus, PaymentDetail, PaymentStatus};
use crate::domain::foundation::{MandateId, PaymentId, SessionToken};
use crate::ports::{
    CompletedRedirectFlow, CreatePaymentRequest, CreateRedirectFlowRequest, GatewayError,
    PaymentGateway, RedirectFlow,
};

use super::types::*;

/// API version pin; GoCardless routes requests by this header.
const API_VERSION: &str = "2015-07-06";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// [`PaymentGateway`] backed by the GoCardless REST API.
pub struct GoCardlessClient {
    http: reqwest::Client,
    token: SecretString,
    base_url: String,
}

impl GoCardlessClient {
    pub fn new(config: &GoCardlessConfig) -> Result<Self, reqwest::Error> {
        Self::with_base_url(
            config.access_token.clone(),
            config.environment.api_base().to_string(),
        )
    }

    fn with_base_url(token: SecretString, base_url: String) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "GoCardless-Version",
            HeaderValue::from_static(API_VERSION),
        );
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;
        Ok(Self {
            http,
            token,
            base_url,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }

    /// Maps a non-2xx response to a gateway error: client errors are
    /// rejections carrying the API's message, server errors are treated
    /// as transient.
    async fn error_from(response: reqwest::Response) -> GatewayError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_server_error() {
            return GatewayError::network(format!("gateway returned {status}"));
        }

        match serde_json::from_str::<ApiErrorEnvelope>(&body) {
            Ok(envelope) => GatewayError::rejected(envelope.error.error_type, envelope.error.message),
            Err(_) => GatewayError::rejected(None, format!("gateway returned {status}")),
        }
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GatewayError> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        response
            .json::<T>()
            .await
            .map_err(|err| GatewayError::network(format!("unreadable gateway response: {err}")))
    }

    fn send_error(err: reqwest::Error) -> GatewayError {
        GatewayError::network(err.to_string())
    }
}

#[async_trait]
impl PaymentGateway for GoCardlessClient {
    async fn create_redirect_flow(
        &self,
        request: CreateRedirectFlowRequest,
    ) -> Result<RedirectFlow, GatewayError> {
        let body = CreateRedirectFlowEnvelope {
            redirect_flows: CreateRedirectFlowBody {
                description: request.description,
                session_token: request.session_token.as_str().to_string(),
                success_redirect_url: request.success_redirect_url,
                prefilled_customer: PrefilledCustomer {
                    given_name: request.prefilled_customer.given_name,
                    family_name: request.prefilled_customer.family_name,
                    email: request.prefilled_customer.email,
                },
            },
        };

        let response = self
            .http
            .post(self.url("/redirect_flows"))
            .header(AUTHORIZATION, self.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(Self::send_error)?;
        let envelope: RedirectFlowEnvelope = Self::parse(response).await?;

        let redirect_url = envelope.redirect_flows.redirect_url.ok_or_else(|| {
            GatewayError::network("redirect flow response carried no redirect_url")
        })?;
        Ok(RedirectFlow {
            id: envelope.redirect_flows.id,
            redirect_url,
        })
    }

    async fn complete_redirect_flow(
        &self,
        flow_id: &str,
        session_token: &SessionToken,
    ) -> Result<CompletedRedirectFlow, GatewayError> {
        let body = CompleteRedirectFlowEnvelope {
            data: CompleteRedirectFlowBody {
                session_token: session_token.as_str().to_string(),
            },
        };

        let response = self
            .http
            .post(self.url(&format!("/redirect_flows/{flow_id}/actions/complete")))
            .header(AUTHORIZATION, self.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(Self::send_error)?;
        let envelope: RedirectFlowEnvelope = Self::parse(response).await?;

        let mandate = envelope.redirect_flows.links.mandate.ok_or_else(|| {
            GatewayError::network("completed redirect flow carried no mandate link")
        })?;
        Ok(CompletedRedirectFlow {
            id: envelope.redirect_flows.id,
            mandate_id: MandateId::new(mandate)
                .map_err(|err| GatewayError::network(err.to_string()))?,
        })
    }

    async fn get_mandate(&self, id: &MandateId) -> Result<MandateDetail, GatewayError> {
        let response = self
            .http
            .get(self.url(&format!("/mandates/{}", id.as_str())))
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(Self::send_error)?;
        let envelope: MandateEnvelope = Self::parse(response).await?;
        mandate_detail(envelope.mandates)
    }

    async fn cancel_mandate(&self, id: &MandateId) -> Result<MandateDetail, GatewayError> {
        let response = self
            .http
            .post(self.url(&format!("/mandates/{}/actions/cancel", id.as_str())))
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(Self::send_error)?;
        let envelope: MandateEnvelope = Self::parse(response).await?;
        mandate_detail(envelope.mandates)
    }

    async fn create_payment(
        &self,
        request: CreatePaymentRequest,
    ) -> Result<PaymentDetail, GatewayError> {
        let body = CreatePaymentEnvelope {
            payments: CreatePaymentBody {
                amount: request.amount,
                currency: request.currency,
                description: request.description,
                links: CreatePaymentLinks {
                    mandate: request.mandate_id.as_str().to_string(),
                },
            },
        };

        let response = self
            .http
            .post(self.url("/payments"))
            .header(AUTHORIZATION, self.auth_header())
            .header("Idempotency-Key", &request.idempotency_key)
            .json(&body)
            .send()
            .await
            .map_err(Self::send_error)?;
        let envelope: PaymentEnvelope = Self::parse(response).await?;
        payment_detail(envelope.payments)
    }

    async fn get_payment(&self, id: &PaymentId) -> Result<PaymentDetail, GatewayError> {
        let response = self
            .http
            .get(self.url(&format!("/payments/{}", id.as_str())))
            .header(AUTHORIZATION, self.auth_header())
            .send()
            .await
            .map_err(Self::send_error)?;
        let envelope: PaymentEnvelope = Self::parse(response).await?;
        payment_detail(envelope.payments)
    }
}

fn mandate_detail(resource: MandateResource) -> Result<MandateDetail, GatewayError> {
    Ok(MandateDetail {
        id: MandateId::new(resource.id).map_err(|err| GatewayError::network(err.to_string()))?,
        status: MandateStatus::new(resource.status),
        reference: resource.reference,
        customer_id: resource.links.customer,
        creditor_id: resource.links.creditor,
        customer_bank_account_id: resource.links.customer_bank_account,
    })
}

fn payment_detail(resource: PaymentResource) -> Result<PaymentDetail, GatewayError> {
    let mandate_id = match resource.links.mandate {
        Some(mandate) => {
            Some(MandateId::new(mandate).map_err(|err| GatewayError::network(err.to_string()))?)
        }
        None => None,
    };
    Ok(PaymentDetail {
        id: PaymentId::new(resource.id).map_err(|err| GatewayError::network(err.to_string()))?,
        status: PaymentStatus::new(resource.status),
        amount: resource.amount,
        currency: resource.currency,
        charge_date: resource.charge_date,
        // settlement date arrives via webhooks, not the payment resource
        payout_date: None,
        amount_refunded: resource.amount_refunded,
        reference: resource.reference,
        description: resource.description,
        creditor_id: resource.links.creditor,
        payout_id: resource.links.payout,
        mandate_id,
    })
}
