//!
//! Documentation of the mailer module.
//! Sends booking notifications through an HTTP mail relay.
//!
//! Delivery is fire-and-forget: the admission decision has already been
//! committed by the time anything here runs, and a relay failure only logs.
//!



use super::config::config::ConfyConfig;

use anyhow::{Context, Error};
use serde_json::json;
use log::{error, info};

/// One outgoing notification
#[derive(Debug, Clone)]
pub struct EmailData {
    pub subject: String,
    pub message: String,
}

/// Posts a single email to the relay
async fn send_email(config: &ConfyConfig, address: &str, email: &EmailData) -> Result<(), Error> {
    let client = reqwest::Client::new();

    let response = client
        .post(&config.mail_relay_url)
        .json(&json!({
            "from":    config.mail_sender,
            "to":      address,
            "subject": email.subject,
            "message": email.message,
        }))
        .send()
        .await
        .context("failed to send request to mail relay")?;

    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "got non-success status {}",
            response.status()
        ))?;
    }

    info!("{}", format!("Mailer:\tEmail sent to {}: {}", address, &email.subject));
    Ok(())
}

///
/// Notifies the guest and the host of a fresh booking, off the request path.
///
/// # Arguments
///
/// * `config` - owned config (the task outlives the request)
/// * `guest_email` / `host_email` - recipients
/// * `guest_name` / `transaction_id` - message content
///
pub fn notify_booking(
    config: ConfyConfig,
    guest_email: String,
    guest_name: String,
    host_email: String,
    transaction_id: String,
) {
    if config.mail_relay_url.is_empty() {
        return;
    }

    rocket::tokio::spawn(async move {
        let to_guest = EmailData {
            subject: "Booking Successful!".to_string(),
            message: format!(
                "Vehicle Ready, get your vehicle from store, Your Transaction Id: {}",
                transaction_id
            ),
        };
        if let Err(value) = send_email(&config, &guest_email, &to_guest).await {
            error!("{}", format!("Mailer:\tcould not reach {}: {}", &guest_email, value));
        }

        let to_host = EmailData {
            subject: "Your Vehicle got booked!".to_string(),
            message: format!(
                "Deliver your vehicle to the store. {} is on the way.....",
                guest_name
            ),
        };
        if let Err(value) = send_email(&config, &host_email, &to_host).await {
            error!("{}", format!("Mailer:\tcould not reach {}: {}", &host_email, value));
        }
    });
}
