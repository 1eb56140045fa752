// Push-messaging webhook adapter
//
// Sends one flex "bubble" card to a single fixed recipient with bearer auth.

use crate::client::{error_for_status, map_reqwest_error};
use async_trait::async_trait;
use cctv_core::error::Result;
use cctv_core::port::{Alert, Notifier};
use serde_json::{json, Value};
use tracing::debug;

const SERVICE: &str = "Push API";

pub const DEFAULT_PUSH_ENDPOINT: &str = "https://api.line.me/v2/bot/message/push";

pub struct PushNotifier {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
    recipient: String,
}

impl PushNotifier {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        access_token: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            access_token: access_token.into(),
            recipient: recipient.into(),
        }
    }

    fn payload(&self, alert: &Alert) -> Value {
        json!({
            "to": self.recipient,
            "messages": [alert_card(alert)],
        })
    }
}

/// Minimal flex card: title header + one label/value row per field
fn alert_card(alert: &Alert) -> Value {
    let rows: Vec<Value> = alert
        .fields
        .iter()
        .map(|(label, value)| {
            // The push API rejects empty text components
            let value = if value.trim().is_empty() { "-" } else { value.as_str() };
            json!({
                "type": "box",
                "layout": "baseline",
                "contents": [
                    {"type": "text", "text": label, "size": "sm", "color": "#888888", "flex": 2},
                    {"type": "text", "text": value, "size": "sm", "wrap": true, "flex": 5}
                ]
            })
        })
        .collect();

    json!({
        "type": "flex",
        "altText": format!("{}: {}", alert.title, alert.tracking_id),
        "contents": {
            "type": "bubble",
            "header": {
                "type": "box",
                "layout": "vertical",
                "contents": [
                    {"type": "text", "text": alert.title, "weight": "bold", "size": "md"}
                ]
            },
            "body": {
                "type": "box",
                "layout": "vertical",
                "spacing": "sm",
                "contents": rows
            }
        }
    })
}

#[async_trait]
impl Notifier for PushNotifier {
    async fn notify(&self, alert: &Alert) -> Result<()> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(&self.payload(alert))
            .send()
            .await
            .map_err(|e| map_reqwest_error(SERVICE, e))?;
        error_for_status(SERVICE, response).await?;

        debug!(tracking_id = %alert.tracking_id, "Alert pushed");
        Ok(())
    }
}
