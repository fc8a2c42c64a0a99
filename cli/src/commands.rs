pub mod list_functions;
pub mod tail_queue;
pub mod tail_topic;
use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// List Lambda functions in all regions, with the time they were used last
    ListFunctions(list_functions::ListFunctionsCommand),

    /// Tail the messages going into an SNS topic
    TailTopic(tail_topic::TailTopicCommand),

    /// Tail the messages going into an SQS queue
    TailQueue(tail_queue::TailQueueCommand),
}
