use eyre::Context;
use serde::Deserialize;

/// Header SNS sets on every HTTP delivery
pub(crate) const MESSAGE_TYPE_HEADER: &str = "x-amz-sns-message-type";

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RawEnvelope {
    #[serde(rename = "Type")]
    kind: Option<String>,
    message_id: Option<String>,
    message: Option<String>,
    #[serde(rename = "SubscribeURL")]
    subscribe_url: Option<String>,
}

/// A request SNS posts to a subscribed HTTP endpoint
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Envelope {
    /// The endpoint has to GET the URL to start receiving notifications
    SubscriptionConfirmation { subscribe_url: String },
    Notification {
        message_id: Option<String>,
        message: String,
    },
    UnsubscribeConfirmation,
    Unknown(String),
}

impl Envelope {
    /// The header says what the body is, the body's own "Type" is the fallback
    pub(crate) fn parse(message_type: Option<&str>, body: &[u8]) -> eyre::Result<Self> {
        let raw: RawEnvelope =
            serde_json::from_slice(body).wrap_err("SNS request body is not a valid JSON")?;

        let kind = message_type
            .map(str::to_string)
            .or(raw.kind)
            .unwrap_or_default();

        Ok(match kind.as_str() {
            "SubscriptionConfirmation" => Envelope::SubscriptionConfirmation {
                subscribe_url: raw
                    .subscribe_url
                    .ok_or_else(|| eyre::eyre!("Subscription confirmation without SubscribeURL"))?,
            },
            "Notification" => Envelope::Notification {
                message_id: raw.message_id,
                message: raw.message.unwrap_or_default(),
            },
            "UnsubscribeConfirmation" => Envelope::UnsubscribeConfirmation,
            _ => Envelope::Unknown(kind),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_carries_the_message() {
        let body = br#"{
            "Type": "Notification",
            "MessageId": "22b80b92-fdea-4c2c-8f9d-bdfb0c7bf324",
            "TopicArn": "arn:aws:sns:us-west-2:123456789012:MyTopic",
            "Message": "Hello world!",
            "Timestamp": "2012-05-02T00:54:06.655Z"
        }"#;

        let envelope = Envelope::parse(Some("Notification"), body).unwrap();

        assert_eq!(
            envelope,
            Envelope::Notification {
                message_id: Some("22b80b92-fdea-4c2c-8f9d-bdfb0c7bf324".into()),
                message: "Hello world!".into(),
            }
        );
    }

    #[test]
    fn confirmation_needs_subscribe_url() {
        let body = br#"{
            "Type": "SubscriptionConfirmation",
            "SubscribeURL": "https://sns.us-west-2.amazonaws.com/?Action=ConfirmSubscription&Token=abc"
        }"#;

        // No header, the body type is used
        let envelope = Envelope::parse(None, body).unwrap();
        assert!(matches!(
            envelope,
            Envelope::SubscriptionConfirmation { subscribe_url } if subscribe_url.contains("ConfirmSubscription")
        ));

        assert!(Envelope::parse(Some("SubscriptionConfirmation"), b"{}").is_err());
    }

    #[test]
    fn other_requests() {
        assert_eq!(
            Envelope::parse(Some("UnsubscribeConfirmation"), b"{}").unwrap(),
            Envelope::UnsubscribeConfirmation
        );
        assert_eq!(
            Envelope::parse(None, b"{}").unwrap(),
            Envelope::Unknown(String::new())
        );
        assert!(Envelope::parse(None, b"not json").is_err());
    }
}
