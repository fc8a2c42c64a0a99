use super::{MessageReceiver, QueueDirectory, QueuePage, ReceivedMessage};
use crate::error::Error;
use aws_config::SdkConfig;
use eyre::Context;

/// Maximum page size of ListQueues
const LIST_PAGE_SIZE: i32 = 1000;

/// SQS client of the region from the shared config
pub(crate) struct SqsQueues {
    client: aws_sdk_sqs::Client,
}

impl SqsQueues {
    pub(crate) fn new(config: &SdkConfig) -> Self {
        SqsQueues {
            client: aws_sdk_sqs::Client::new(config),
        }
    }
}

impl QueueDirectory for SqsQueues {
    async fn list_queues(
        &self,
        prefix: &str,
        next_token: Option<String>,
    ) -> eyre::Result<QueuePage> {
        let output = self
            .client
            .list_queues()
            .queue_name_prefix(prefix)
            .max_results(LIST_PAGE_SIZE)
            .set_next_token(next_token)
            .send()
            .await
            .wrap_err(Error::upstream("Failed to list SQS queues", None))?;

        Ok(QueuePage {
            queue_urls: output.queue_urls().to_vec(),
            next_token: output.next_token().map(str::to_string),
        })
    }
}

impl MessageReceiver for SqsQueues {
    async fn receive(
        &self,
        queue_url: &str,
        max_messages: i32,
        wait_seconds: i32,
    ) -> eyre::Result<Vec<ReceivedMessage>> {
        let output = self
            .client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait_seconds)
            .send()
            .await
            .wrap_err(Error::upstream(
                "Failed to receive SQS messages",
                Some(&format!("Queue {queue_url}")),
            ))?;

        Ok(output
            .messages()
            .iter()
            .map(|m| ReceivedMessage {
                id: m.message_id().unwrap_or_default().to_string(),
                body: m.body().unwrap_or_default().to_string(),
            })
            .collect())
    }
}
