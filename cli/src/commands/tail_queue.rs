use crate::error::Error;
use crate::keypress::Keypress;
use crate::queue::{self, SeenMessageWindow, SqsQueues};
use crate::runner::{Runnable, Runner};
use crate::writer::Writer;

#[derive(clap::Args, Clone)]
pub(crate) struct TailQueueCommand {
    /// Name of the SQS queue, e.g. task-queue-dev
    #[arg(short = 'n', long)]
    queue_name: String,

    /// AWS region, e.g. us-east-1
    #[arg(short, long)]
    region: String,

    /// AWS CLI profile name
    #[arg(short, long)]
    profile: Option<String>,
}

impl Runnable for TailQueueCommand {
    fn runner(&self) -> impl Runner {
        TailQueueRunner {
            command: self.clone(),
        }
    }
}

struct TailQueueRunner {
    command: TailQueueCommand,
}

impl Runner for TailQueueRunner {
    /// Long-polls the queue and prints new messages until a key is pressed
    async fn run(&mut self) -> Result<(), Error> {
        let settings = self.settings()?;
        let profile = settings.profile(self.command.profile.clone());
        let config = self
            .aws_config(Some(&self.command.region), profile.as_deref())
            .await;

        let sqs = SqsQueues::new(&config);

        println!(
            "{} {} {}",
            console::style("finding the queue").bold().green(),
            console::style(format!("[{}]", self.command.queue_name)).bold(),
            console::style(format!("in [{}]", self.command.region)).dim(),
        );

        let queue_url = queue::resolve_queue_url(&sqs, &self.command.queue_name).await?;

        println!("polling SQS queue [{queue_url}]...");
        println!("press <any key> to stop");

        let keypress = Keypress::listen();
        let stop = keypress.token();

        let mut window = SeenMessageWindow::default();
        let printed =
            queue::tail(&sqs, &queue_url, &stop, &mut window, &mut Writer::stdout()).await?;

        log::info!("Printed {printed} messages from {queue_url}");
        Ok(())
    }
}
