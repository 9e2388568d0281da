//! Recording mailer for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{ApprovalRequestEmail, DecisionEmail, EmailError, Mailer};

#[derive(Default)]
struct State {
    approval_requests: Vec<ApprovalRequestEmail>,
    decisions: Vec<DecisionEmail>,
    fail_next: bool,
}

/// [`Mailer`] that captures everything it is asked to send.
#[derive(Default)]
pub struct RecordingMailer {
    state: Mutex<State>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next send fail.
    pub fn fail_next(&self) {
        self.state.lock().unwrap().fail_next = true;
    }

    pub fn approval_requests(&self) -> Vec<ApprovalRequestEmail> {
        self.state.lock().unwrap().approval_requests.clone()
    }

    pub fn decisions(&self) -> Vec<DecisionEmail> {
        self.state.lock().unwrap().decisions.clone()
    }

    fn take_failure(state: &mut State) -> Result<(), EmailError> {
        if state.fail_next {
            state.fail_next = false;
            Err(EmailError::new("simulated delivery failure"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_approval_request(&self, email: &ApprovalRequestEmail) -> Result<(), EmailError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        state.approval_requests.push(email.clone());
        Ok(())
    }

    async fn send_decision(&self, email: &DecisionEmail) -> Result<(), EmailError> {
        let mut state = self.state.lock().unwrap();
        Self::take_failure(&mut state)?;
        state.decisions.push(email.clone());
        Ok(())
    }
}
