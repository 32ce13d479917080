//!
//! Documentation of the payments module.
//! Creates Stripe payment intents; the admission procedure only ever sees
//! the resulting transaction reference.
//!



use super::config::config::ConfyConfig;

use anyhow::{Context, Error};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
struct PaymentIntent {
    client_secret: String,
}

///
/// Creates a card payment intent for a price in whole currency units.
///
/// # Arguments
///
/// * `config` - carries the Stripe endpoint and secret key
/// * `price` - price in dollars; converted to cents for the API
///
/// # Output
///
/// * Ok(secret) - the client secret the frontend confirms with
/// * Err(_) - the API refused or could not be reached
///
pub async fn create_payment_intent(config: &ConfyConfig, price: f64) -> Result<String, Error> {
    let amount = (price * 100.0) as i64;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/payment_intents", config.stripe_api_url))
        .bearer_auth(&config.stripe_secret_key)
        .form(&[
            ("amount", amount.to_string()),
            ("currency", "usd".to_string()),
            ("payment_method_types[]", "card".to_string()),
        ])
        .send()
        .await
        .context("failed to send request to Stripe")?;

    if !response.status().is_success() {
        return Err(anyhow::anyhow!(
            "got non-success status {}",
            response.status()
        ))?;
    }

    let intent: PaymentIntent = response
        .json()
        .await
        .context("failed to deserialize payment intent")?;

    Ok(intent.client_secret)
}
