use super::{PushSubscriber, TopicDirectory, TopicPage};
use crate::error::Error;
use aws_config::SdkConfig;
use eyre::Context;

/// SNS client of the region from the shared config
pub(crate) struct SnsTopics {
    client: aws_sdk_sns::Client,
}

impl SnsTopics {
    pub(crate) fn new(config: &SdkConfig) -> Self {
        SnsTopics {
            client: aws_sdk_sns::Client::new(config),
        }
    }
}

impl TopicDirectory for SnsTopics {
    async fn list_topics(&self, next_token: Option<String>) -> eyre::Result<TopicPage> {
        let output = self
            .client
            .list_topics()
            .set_next_token(next_token)
            .send()
            .await
            .wrap_err(Error::upstream("Failed to list SNS topics", None))?;

        Ok(TopicPage {
            topic_arns: output
                .topics()
                .iter()
                .filter_map(|t| t.topic_arn().map(str::to_string))
                .collect(),
            next_token: output.next_token().map(str::to_string),
        })
    }
}

impl PushSubscriber for SnsTopics {
    async fn subscribe(
        &self,
        topic_arn: &str,
        protocol: &str,
        endpoint: &str,
    ) -> eyre::Result<String> {
        let output = self
            .client
            .subscribe()
            .topic_arn(topic_arn)
            .protocol(protocol)
            .endpoint(endpoint)
            .return_subscription_arn(true)
            .send()
            .await
            .wrap_err(Error::upstream(
                "Failed to subscribe to the SNS topic",
                Some(&format!("Endpoint {endpoint}")),
            ))?;

        output
            .subscription_arn()
            .map(str::to_string)
            .ok_or_else(|| eyre::eyre!("SNS did not return a subscription ARN"))
    }

    async fn unsubscribe(&self, subscription_arn: &str) -> eyre::Result<()> {
        self.client
            .unsubscribe()
            .subscription_arn(subscription_arn)
            .send()
            .await
            .wrap_err(Error::upstream("Failed to unsubscribe from SNS", None))?;

        Ok(())
    }
}
