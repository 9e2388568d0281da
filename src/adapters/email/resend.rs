//! Mailer backed by the Resend HTTP API.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;

use crate::config::EmailConfig;
use crate::ports::{ApprovalRequestEmail, DecisionEmail, EmailError, Mailer};

const RESEND_API_URL: &str = "https://api.resend.com/emails";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Serialize)]
struct SendEmailRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    text: String,
}

/// [`Mailer`] sending plaintext notifications through Resend.
pub struct ResendMailer {
    http: reqwest::Client,
    api_key: SecretString,
    api_url: String,
    from_address: String,
    /// Every approval request goes to this fixed address.
    approver_address: String,
}

impl ResendMailer {
    pub fn new(config: &EmailConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            api_key: config.resend_api_key.clone(),
            api_url: RESEND_API_URL.to_string(),
            from_address: config.from_address.clone(),
            approver_address: config.approver_address.clone(),
        })
    }

    async fn send(&self, request: &SendEmailRequest) -> Result<(), EmailError> {
        let response = self
            .http
            .post(&self.api_url)
            .header(
                AUTHORIZATION,
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .json(request)
            .send()
            .await
            .map_err(|err| EmailError::new(err.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(EmailError::new(format!(
                "mail API returned {}",
                response.status()
            )))
        }
    }
}

#[async_trait]
impl Mailer for ResendMailer {
    async fn send_approval_request(&self, email: &ApprovalRequestEmail) -> Result<(), EmailError> {
        let body = format!(
            "{name} has applied to become a supporter member.\n\
             \n\
             Annual fee: {fee}\n\
             Statement:\n\
             {statement}\n\
             \n\
             Approve: {approve}\n\
             Reject:  {reject}\n",
            name = email.applicant.full_name(),
            fee = email.fee,
            statement = email.statement,
            approve = email.approve_url,
            reject = email.reject_url,
        );
        self.send(&SendEmailRequest {
            from: self.from_address.clone(),
            to: vec![self.approver_address.clone()],
            subject: format!(
                "Supporter membership application from {}",
                email.applicant.full_name()
            ),
            text: body,
        })
        .await
    }

    async fn send_decision(&self, email: &DecisionEmail) -> Result<(), EmailError> {
        let body = format!(
            "Hi {name},\n\
             \n\
             Your supporter membership application (annual fee {fee}) has been {status}.\n",
            name = email.applicant.first_name,
            fee = email.fee,
            status = email.status,
        );
        self.send(&SendEmailRequest {
            from: self.from_address.clone(),
            to: vec![email.applicant.email.clone()],
            subject: format!("Your supporter membership application was {}", email.status),
            text: body,
        })
        .await
    }
}
