use super::envelope::{Envelope, MESSAGE_TYPE_HEADER};
use crate::writer::Writer;
use bytes::Bytes;
use chrono::Utc;
use eyre::Context;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::error::Error as StdError;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

/// SNS messages are at most 256 KiB, the JSON envelope around them adds a bit
const MAX_BODY_BYTES: usize = 300 * 1024;

/// Local HTTP endpoint receiving SNS deliveries
pub(crate) struct Webhook {
    addr: SocketAddr,
    stop: CancellationToken,
    server: JoinHandle<()>,
}

impl Webhook {
    /// Listen on a local port, 0 picks a free one
    pub(crate) async fn start(port: u16) -> eyre::Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .wrap_err(format!("Failed to bind the local webhook listener to port {port}"))?;

        let addr = listener.local_addr()?;
        let stop = CancellationToken::new();
        let server = tokio::spawn(serve(listener, reqwest::Client::new(), stop.clone()));

        log::info!("Webhook is listening on {addr}");
        Ok(Webhook { addr, stop, server })
    }

    pub(crate) fn local_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Stop accepting connections
    pub(crate) async fn stop(self) {
        self.stop.cancel();

        if let Err(error) = self.server.await {
            log::error!("Webhook server task failed: {error:?}");
        }

        log::info!("Webhook on {} stopped", self.addr);
    }
}

async fn serve(listener: TcpListener, http: reqwest::Client, stop: CancellationToken) {
    loop {
        let (stream, remote) = tokio::select! {
            _ = stop.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok(accepted) => accepted,
                Err(error) => {
                    log::warn!("Failed to accept webhook connection: {error:?}");
                    continue;
                }
            },
        };

        log::debug!("Webhook connection from {remote}");

        let http = http.clone();
        let service = service_fn(move |request| handle(request, http.clone()));

        tokio::spawn(async move {
            if let Err(error) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                log::error!("Webhook connection error: {error:?}");
            }
        });
    }
}

async fn handle(
    request: Request<Incoming>,
    http: reqwest::Client,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let message_type = request
        .headers()
        .get(MESSAGE_TYPE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = match read_body(request.into_body()).await {
        Ok(body) => body,
        Err(status) => return Ok(respond(status)),
    };

    let envelope = match Envelope::parse(message_type.as_deref(), &body) {
        Ok(envelope) => envelope,
        Err(error) => {
            log::warn!("Rejected webhook request: {error:?}");
            return Ok(respond(StatusCode::BAD_REQUEST));
        }
    };

    receive(envelope, &http).await;
    Ok(respond(StatusCode::OK))
}

/// Read the whole body unless it is larger than an SNS delivery can be
async fn read_body<B>(body: B) -> Result<Bytes, StatusCode>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    match Limited::new(body, MAX_BODY_BYTES).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(error) if error.downcast_ref::<LengthLimitError>().is_some() => {
            log::warn!("Rejected webhook request over {MAX_BODY_BYTES} bytes");
            Err(StatusCode::PAYLOAD_TOO_LARGE)
        }
        Err(error) => {
            log::warn!("Failed to read webhook request: {error:?}");
            Err(StatusCode::BAD_REQUEST)
        }
    }
}

async fn receive(envelope: Envelope, http: &reqwest::Client) {
    match envelope {
        Envelope::SubscriptionConfirmation { subscribe_url } => {
            match confirm(http, &subscribe_url).await {
                Ok(()) => log::info!("Subscription confirmed"),
                Err(error) => log::error!("Failed to confirm the subscription: {error:?}"),
            }
        }

        Envelope::Notification {
            message_id,
            message,
        } => {
            log::debug!("Notification {message_id:?}");

            if let Err(error) = Writer::stdout().message(Utc::now(), &message) {
                log::error!("Failed to print notification: {error:?}");
            }
        }

        Envelope::UnsubscribeConfirmation => log::info!("Unsubscribe confirmed"),
        Envelope::Unknown(kind) => log::warn!("Ignoring SNS request of type {kind:?}"),
    }
}

/// Visit the confirmation URL, which must point to SNS itself
async fn confirm(http: &reqwest::Client, subscribe_url: &str) -> eyre::Result<()> {
    if !is_sns_url(subscribe_url) {
        eyre::bail!("SubscribeURL does not point to SNS: {subscribe_url}");
    }

    let response = http
        .get(subscribe_url)
        .send()
        .await
        .wrap_err("Failed to call SubscribeURL")?;

    if !response.status().is_success() {
        eyre::bail!("SNS rejected the confirmation with {}", response.status());
    }

    Ok(())
}

fn is_sns_url(value: &str) -> bool {
    Url::parse(value).is_ok_and(|url| {
        url.scheme() == "https"
            && url
                .host_str()
                .is_some_and(|host| host.starts_with("sns.") && host.ends_with(".amazonaws.com"))
    })
}

fn respond(status: StatusCode) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = status;
    response
}
