use super::{MessageReceiver, SeenMessageWindow};
use crate::writer::Writer;
use chrono::Utc;
use std::io::Write;
use tokio_util::sync::CancellationToken;

/// Long-poll wait time of a single receive call
const WAIT_SECONDS: i32 = 5;

/// The most SQS returns in one receive call
const MAX_MESSAGES: i32 = 10;

/// Print new messages of a queue until stopped
///
/// The stop signal is checked between receive calls, an in-flight call is let to finish
/// and its messages are still printed. "stopping..." is shown as soon as a stop is
/// requested, never after a failed receive. Empty responses are re-polled right away,
/// the long-poll wait does the throttling. Returns the number of printed messages.
pub(crate) async fn tail<W: Write>(
    receiver: &impl MessageReceiver,
    queue_url: &str,
    stop: &CancellationToken,
    window: &mut SeenMessageWindow,
    writer: &mut Writer<W>,
) -> eyre::Result<usize> {
    let mut printed = 0;
    let mut announced = false;

    while !stop.is_cancelled() {
        let receive = receiver.receive(queue_url, MAX_MESSAGES, WAIT_SECONDS);
        tokio::pin!(receive);

        let messages = tokio::select! {
            messages = &mut receive => messages?,
            _ = stop.cancelled() => {
                writer.text("stopping...")?;
                announced = true;
                receive.await?
            }
        };

        for message in messages {
            // Redelivered, e.g. after its visibility timeout
            if !window.insert(&message.id) {
                log::debug!("Skipping already seen message {}", message.id);
                continue;
            }

            writer.message(Utc::now(), &message.body)?;
            printed += 1;
        }
    }

    if !announced {
        writer.text("stopping...")?;
    }

    window.clear();
    writer.text("stopped")?;
    Ok(printed)
}
