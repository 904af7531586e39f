//! Payment provider integration via REST API (no SDK dependency)
//!
//! Checkout sessions are created against the branch's connected account so
//! funds settle with the branch operator. Webhook verification is HMAC-SHA256
//! over the raw body, with a replay window.

use std::time::Duration;

use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Unexpected payment provider response: {0}")]
    UnexpectedResponse(String),

    #[error("Webhook verification failed: {0}")]
    InvalidWebhook(&'static str),
}

/// Card network reported by the payment provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardBrand {
    Visa,
    Mastercard,
    Amex,
    Other,
}

impl CardBrand {
    /// Parse the provider's brand string; anything unrecognized is Other
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "visa" => CardBrand::Visa,
            "mastercard" => CardBrand::Mastercard,
            "amex" | "american_express" => CardBrand::Amex,
            _ => CardBrand::Other,
        }
    }
}

/// One line item for a checkout session, priced by catalog price id
#[derive(Debug, Clone)]
pub struct CheckoutLineItem {
    pub price_id: String,
    pub quantity: i32,
}

/// Webhook event fields the order flow cares about
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventData {
    pub object: WebhookObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookObject {
    pub id: String,
    #[serde(default)]
    pub metadata: WebhookMetadata,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookMetadata {
    #[serde(default)]
    pub order_id: Option<String>,
}

#[derive(Clone)]
pub struct PaymentClient {
    client: reqwest::Client,
    secret_key: String,
}

impl PaymentClient {
    pub fn new(secret_key: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self { client, secret_key }
    }

    /// Create a card-only checkout session on the branch's connected account
    ///
    /// The order id travels in session metadata so the webhook can find the
    /// order without a session-id column. Returns the hosted checkout URL.
    pub async fn create_checkout_session(
        &self,
        order_id: i64,
        items: &[CheckoutLineItem],
        connected_account: &str,
        success_url: &str,
        cancel_url: &str,
    ) -> Result<String, PaymentError> {
        let order_id = order_id.to_string();
        let mut form: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), success_url.to_string()),
            ("cancel_url".to_string(), cancel_url.to_string()),
            ("metadata[order_id]".to_string(), order_id.clone()),
            (
                "payment_intent_data[transfer_data][destination]".to_string(),
                connected_account.to_string(),
            ),
            (
                "payment_intent_data[metadata][order_id]".to_string(),
                order_id,
            ),
        ];
        for (i, item) in items.iter().enumerate() {
            form.push((format!("line_items[{i}][price]"), item.price_id.clone()));
            form.push((format!("line_items[{i}][quantity]"), item.quantity.to_string()));
        }

        let resp: serde_json::Value = self
            .client
            .post("https://api.stripe.com/v1/checkout/sessions")
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&form)
            .send()
            .await?
            .json()
            .await?;

        resp["url"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| {
                PaymentError::UnexpectedResponse(format!("checkout session create failed: {resp}"))
            })
    }

    /// Look up the card brand used to pay a completed checkout session
    ///
    /// Expands through the payment intent's latest charge. A missing brand is
    /// not an error; the POS code for unknown brands is the safe default.
    pub async fn get_card_brand(&self, session_id: &str) -> Result<CardBrand, PaymentError> {
        let resp: serde_json::Value = self
            .client
            .get(format!(
                "https://api.stripe.com/v1/checkout/sessions/{session_id}"
            ))
            .basic_auth(&self.secret_key, None::<&str>)
            .query(&[("expand[]", "payment_intent.latest_charge")])
            .send()
            .await?
            .json()
            .await?;

        let brand = resp["payment_intent"]["latest_charge"]["payment_method_details"]["card"]
            ["brand"]
            .as_str()
            .map(CardBrand::parse)
            .unwrap_or(CardBrand::Other);

        Ok(brand)
    }
}

/// Verify a webhook signature header against the raw request body
///
/// Header format is `t=<timestamp>,v1=<hex hmac>`. Events older than five
/// minutes are rejected to prevent replay.
pub fn verify_webhook_signature(
    payload: &[u8],
    sig_header: &str,
    secret: &str,
) -> Result<(), PaymentError> {
    let mut timestamp = "";
    let mut signature = "";
    for part in sig_header.split(',') {
        if let Some(t) = part.strip_prefix("t=") {
            timestamp = t;
        } else if let Some(v) = part.strip_prefix("v1=") {
            signature = v;
        }
    }

    if timestamp.is_empty() || signature.is_empty() {
        return Err(PaymentError::InvalidWebhook("malformed signature header"));
    }

    let signed_payload = format!("{timestamp}.{}", std::str::from_utf8(payload).unwrap_or(""));
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| PaymentError::InvalidWebhook("invalid webhook secret"))?;
    mac.update(signed_payload.as_bytes());

    let sig_bytes =
        hex::decode(signature).map_err(|_| PaymentError::InvalidWebhook("invalid signature hex"))?;
    mac.verify_slice(&sig_bytes)
        .map_err(|_| PaymentError::InvalidWebhook("signature mismatch"))?;

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| PaymentError::InvalidWebhook("invalid timestamp"))?;
    let now = chrono::Utc::now().timestamp();
    if (now - ts).abs() > 300 {
        return Err(PaymentError::InvalidWebhook("timestamp outside tolerance"));
    }

    Ok(())
}
