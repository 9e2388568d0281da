//! Membership workflows: application intake, mandate setup and the
//! approval decision.

mod complete_redirect_flow;
mod decide_application;
mod request_approval;
mod start_redirect_flow;
mod submit_application;

pub use complete_redirect_flow::{CompleteRedirectFlowCommand, CompleteRedirectFlowHandler};
pub use decide_application::{
    DecideApplicationCommand, DecideApplicationHandler, Decision, DecisionOutcome,
};
pub use request_approval::RequestApprovalHandler;
pub use start_redirect_flow::StartRedirectFlowHandler;
pub use submit_application::{SubmitApplicationCommand, SubmitApplicationHandler};
