mod sqs;
mod tailer;
mod window;

pub(crate) use sqs::SqsQueues;
pub(crate) use tailer::tail;
pub(crate) use window::SeenMessageWindow;

use crate::error::Error;

/// One page of queue URLs
#[derive(Debug, Clone, Default)]
pub(crate) struct QueuePage {
    pub(crate) queue_urls: Vec<String>,
    pub(crate) next_token: Option<String>,
}

pub(crate) trait QueueDirectory {
    /// List queues whose names start with the prefix
    async fn list_queues(&self, prefix: &str, next_token: Option<String>)
        -> eyre::Result<QueuePage>;
}

/// A message as received from a queue
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ReceivedMessage {
    pub(crate) id: String,
    pub(crate) body: String,
}

pub(crate) trait MessageReceiver {
    /// Long-poll for up to `max_messages`, waiting at most `wait_seconds` server-side
    async fn receive(
        &self,
        queue_url: &str,
        max_messages: i32,
        wait_seconds: i32,
    ) -> eyre::Result<Vec<ReceivedMessage>>;
}

/// Find the URL of a queue by its exact name
pub(crate) async fn resolve_queue_url(
    directory: &impl QueueDirectory,
    name: &str,
) -> eyre::Result<String> {
    let suffix = format!("/{name}");
    let mut next_token = None;

    loop {
        let page = directory.list_queues(name, next_token).await?;

        if let Some(url) = page.queue_urls.into_iter().find(|url| url.ends_with(&suffix)) {
            return Ok(url);
        }

        match page.next_token {
            Some(token) => next_token = Some(token),
            None => {
                return Err(Error::not_found(
                    &format!("Cannot find the SQS queue [{name}]"),
                    Some("Check the queue name and the region"),
                )
                .into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Kind;
    use std::sync::Mutex;

    struct FakeQueues {
        pages: Vec<QueuePage>,
        calls: Mutex<Vec<(String, Option<String>)>>,
    }

    impl QueueDirectory for FakeQueues {
        async fn list_queues(
            &self,
            prefix: &str,
            next_token: Option<String>,
        ) -> eyre::Result<QueuePage> {
            let mut calls = self.calls.lock().unwrap();
            let index = calls.len();
            calls.push((prefix.to_string(), next_token));
            Ok(self.pages.get(index).cloned().unwrap_or_default())
        }
    }

    fn queues(pages: Vec<(Vec<&str>, Option<&str>)>) -> FakeQueues {
        FakeQueues {
            pages: pages
                .into_iter()
                .map(|(urls, token)| QueuePage {
                    queue_urls: urls.into_iter().map(str::to_string).collect(),
                    next_token: token.map(str::to_string),
                })
                .collect(),
            calls: Mutex::new(vec![]),
        }
    }

    #[tokio::test]
    async fn exact_name_wins_over_prefix_matches() {
        let directory = queues(vec![
            (
                vec!["https://sqs.us-east-1.amazonaws.com/1/task-queue-dev-dlq"],
                Some("t1"),
            ),
            (vec!["https://sqs.us-east-1.amazonaws.com/1/task-queue-dev"], None),
        ]);

        let url = resolve_queue_url(&directory, "task-queue-dev").await.unwrap();

        assert_eq!(url, "https://sqs.us-east-1.amazonaws.com/1/task-queue-dev");

        let calls = directory.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], ("task-queue-dev".to_string(), None));
        assert_eq!(calls[1].1.as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn missing_queue_is_not_found_after_all_pages() {
        let directory = queues(vec![
            (vec!["https://sqs.us-east-1.amazonaws.com/1/other"], Some("t1")),
            (vec![], None),
        ]);

        let error = resolve_queue_url(&directory, "task-queue-dev")
            .await
            .unwrap_err();

        assert_eq!(error.downcast_ref::<Error>().unwrap().kind(), Kind::NotFound);
        assert_eq!(directory.calls.lock().unwrap().len(), 2);
    }
}
