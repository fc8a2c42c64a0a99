mod envelope;
mod sns;
mod subscription;
mod webhook;

pub(crate) use sns::SnsTopics;

use crate::error::Error;
use crate::writer::Writer;
use subscription::Subscription;
use tokio_util::sync::CancellationToken;
use url::Url;
use webhook::Webhook;

/// One page of topic ARNs
#[derive(Debug, Clone, Default)]
pub(crate) struct TopicPage {
    pub(crate) topic_arns: Vec<String>,
    pub(crate) next_token: Option<String>,
}

pub(crate) trait TopicDirectory {
    async fn list_topics(&self, next_token: Option<String>) -> eyre::Result<TopicPage>;
}

/// Registers HTTP(S) endpoints as push subscriptions of a topic
pub(crate) trait PushSubscriber {
    /// Returns the ARN of the new subscription
    async fn subscribe(&self, topic_arn: &str, protocol: &str, endpoint: &str)
        -> eyre::Result<String>;

    async fn unsubscribe(&self, subscription_arn: &str) -> eyre::Result<()>;
}

/// Find the ARN of a topic by its name
///
/// Pages are walked until a topic ARN ends with ":<name>".
pub(crate) async fn resolve_topic_arn(
    directory: &impl TopicDirectory,
    name: &str,
) -> eyre::Result<String> {
    let suffix = format!(":{name}");
    let mut next_token = None;

    loop {
        let page = directory.list_topics(next_token).await?;

        if let Some(arn) = page.topic_arns.into_iter().find(|arn| arn.ends_with(&suffix)) {
            return Ok(arn);
        }

        match page.next_token {
            Some(token) => next_token = Some(token),
            None => {
                return Err(Error::not_found(
                    &format!("Cannot find the SNS topic [{name}]"),
                    Some("Check the topic name and the region"),
                )
                .into())
            }
        }
    }
}

/// Stream messages of a topic until stopped
///
/// The local webhook listens on `port` (any free one for 0) and is subscribed through
/// `public_url` when given, the URL of a tunnel forwarding to the local listener. The
/// listener address is printed before subscribing, SNS sends the confirmation right away.
/// The subscription is removed on the way out.
pub(crate) async fn tail(
    subscriber: &impl PushSubscriber,
    topic_arn: &str,
    public_url: Option<&Url>,
    port: u16,
    stop: CancellationToken,
) -> eyre::Result<()> {
    let webhook = Webhook::start(port).await?;
    let mut writer = Writer::stdout();

    writer.text(&format!("listening on {}", webhook.local_url()))?;

    let endpoint = match public_url {
        Some(url) => {
            writer.text(&format!("subscribing {url}, it must forward to the address above"))?;
            url.to_string()
        }
        None => {
            log::warn!(
                "No public endpoint URL given, SNS can only deliver to {} if it is reachable",
                webhook.local_url()
            );
            webhook.local_url()
        }
    };

    let subscription = match Subscription::create(subscriber, topic_arn, &endpoint).await {
        Ok(subscription) => subscription,
        Err(error) => {
            webhook.stop().await;
            return Err(error);
        }
    };

    writer.text(&format!("polling SNS topic [{topic_arn}]..."))?;
    writer.text("press <any key> to stop")?;

    stop.cancelled().await;
    writer.text("stopping...")?;

    webhook.stop().await;

    // The session ends regardless, a leftover subscription only fails deliveries
    if let Err(error) = subscription.cancel(subscriber).await {
        log::error!("Failed to unsubscribe: {error:?}");
        writer.text(&format!(
            "{}",
            console::style("Failed to unsubscribe from SNS").yellow()
        ))?;
    }

    Ok(())
}
