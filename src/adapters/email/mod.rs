//! Email adapters.

mod recording;
mod resend;

pub use recording::RecordingMailer;
pub use resend::ResendMailer;
