//! Daily delivery orchestration and the two external collaborators it
//! drives: motivational content generation and outbound email.
//!
//! Both collaborators sit behind traits so the orchestrator (and the nudge
//! handler in the API crate) can be exercised in tests without a network.

pub mod content;
pub mod email;
pub mod orchestrator;

pub use content::{ContentGenerator, ContentRequest, FallbackGenerator, HttpContentGenerator, MotivationContent};
pub use email::{DisabledEmailTransport, EmailConfig, EmailTransport, SmtpEmailTransport};
pub use orchestrator::{CycleSummary, Orchestrator};
