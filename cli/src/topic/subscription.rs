use super::PushSubscriber;
use crate::writer::Writer;
use url::Url;

/// A push subscription living for one tail session
#[derive(Debug, Clone)]
pub(crate) struct Subscription {
    pub(crate) topic_arn: String,
    pub(crate) subscription_arn: String,
    pub(crate) endpoint_url: String,
}

impl Subscription {
    pub(crate) async fn create(
        subscriber: &impl PushSubscriber,
        topic_arn: &str,
        endpoint_url: &str,
    ) -> eyre::Result<Self> {
        let subscription_arn = subscriber
            .subscribe(topic_arn, protocol(endpoint_url), endpoint_url)
            .await?;

        log::info!("Subscribed {endpoint_url} to {topic_arn} as {subscription_arn}");
        Writer::stdout().text(&console::style("subscribed to SNS").green().to_string())?;

        Ok(Subscription {
            topic_arn: topic_arn.to_string(),
            subscription_arn,
            endpoint_url: endpoint_url.to_string(),
        })
    }

    pub(crate) async fn cancel(self, subscriber: &impl PushSubscriber) -> eyre::Result<()> {
        subscriber.unsubscribe(&self.subscription_arn).await?;

        log::info!(
            "Unsubscribed {} from {}",
            self.endpoint_url,
            self.topic_arn
        );

        Writer::stdout().text(&console::style("unsubscribed from SNS").green().to_string())?;
        Ok(())
    }
}

/// SNS protocol matching the endpoint scheme, https unless the URL says otherwise
fn protocol(endpoint_url: &str) -> &'static str {
    match Url::parse(endpoint_url) {
        Ok(url) if url.scheme() == "http" => "http",
        _ => "https",
    }
}
