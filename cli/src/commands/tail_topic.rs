use crate::error::Error;
use crate::keypress::Keypress;
use crate::runner::{Runnable, Runner};
use crate::topic::{self, SnsTopics};
use url::Url;

#[derive(clap::Args, Clone)]
pub(crate) struct TailTopicCommand {
    /// Name of the SNS topic, e.g. task-topic-dev
    #[arg(short = 'n', long)]
    topic_name: String,

    /// AWS region, e.g. us-east-1
    #[arg(short, long)]
    region: String,

    /// AWS CLI profile name
    #[arg(short, long)]
    profile: Option<String>,

    /// Public HTTPS URL forwarding to the local listener, e.g. of an ngrok tunnel.
    ///
    /// SNS can not deliver to a local address, without this flag the
    /// subscription only works when the machine is reachable from AWS.
    #[arg(long)]
    endpoint_url: Option<Url>,

    /// Local port of the webhook, so a tunnel can be set up in advance. Any free port by default
    #[arg(long, default_value_t = 0)]
    port: u16,
}

impl Runnable for TailTopicCommand {
    fn runner(&self) -> impl Runner {
        TailTopicRunner {
            command: self.clone(),
        }
    }
}

struct TailTopicRunner {
    command: TailTopicCommand,
}

impl Runner for TailTopicRunner {
    /// Subscribes a local webhook to the topic and prints deliveries until a key is pressed
    async fn run(&mut self) -> Result<(), Error> {
        let settings = self.settings()?;
        let profile = settings.profile(self.command.profile.clone());
        let config = self
            .aws_config(Some(&self.command.region), profile.as_deref())
            .await;

        let sns = SnsTopics::new(&config);

        println!(
            "{} {} {}",
            console::style("finding the topic").bold().green(),
            console::style(format!("[{}]", self.command.topic_name)).bold(),
            console::style(format!("in [{}]", self.command.region)).dim(),
        );

        let topic_arn = topic::resolve_topic_arn(&sns, &self.command.topic_name).await?;

        let keypress = Keypress::listen();

        topic::tail(
            &sns,
            &topic_arn,
            self.command.endpoint_url.as_ref(),
            self.command.port,
            keypress.token(),
        )
        .await?;

        Ok(())
    }
}
