//!
//! Documentation of the payments module.
//! Payment-intent creation against the Stripe REST API.
//!


use super::config;
pub mod payments;
