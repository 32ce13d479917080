//!
//! Documentation of the mailer module.
//! Best-effort email notification through the configured mail relay.
//!


use super::config;
pub mod mailer;
