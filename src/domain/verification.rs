use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerifyStatus {
    Success,
    Pending,
    #[serde(alias = "failed")]
    Failure,
}

/// Wire form of `GET /verify-checkout-session`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VerifyResponse {
    pub status: VerifyStatus,
    #[serde(default, deserialize_with = "deserialize_id")]
    pub order_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_id")]
    pub order_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Details of a confirmed order. `email` is only present for guest orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order_id: String,
    pub order_number: String,
    pub email: Option<String>,
}

/// One poll's answer. `Success` and `Failure` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationResult {
    Success(OrderConfirmation),
    Pending,
    Failure { reason: String },
}

impl From<VerifyResponse> for VerificationResult {
    fn from(response: VerifyResponse) -> Self {
        match response.status {
            VerifyStatus::Pending => VerificationResult::Pending,
            VerifyStatus::Failure => VerificationResult::Failure {
                reason: response
                    .reason
                    .unwrap_or_else(|| "payment was not completed".to_string()),
            },
            VerifyStatus::Success => {
                let (order_id, order_number) = match (response.order_id, response.order_number) {
                    (Some(id), Some(number)) => (id, number),
                    (Some(id), None) => (id.clone(), id),
                    (None, Some(number)) => (number.clone(), number),
                    (None, None) => {
                        return VerificationResult::Failure {
                            reason: "verification succeeded without an order reference"
                                .to_string(),
                        };
                    }
                };
                VerificationResult::Success(OrderConfirmation {
                    order_id,
                    order_number,
                    email: response.email.filter(|e| !e.trim().is_empty()),
                })
            }
        }
    }
}

/// Order ids come back as strings or integers depending on the backend.
fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
