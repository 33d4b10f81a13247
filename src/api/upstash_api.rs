use crate::error::PasteError;
use backon::{ExponentialBuilder, Retryable};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use url::Url;

fn default_retry_policy() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(200))
        .with_max_delay(Duration::from_secs(2))
        .with_max_times(3)
        .with_jitter()
}

/// One reply from the Upstash REST API: either `result` or `error` is set.
#[derive(Debug, Deserialize)]
struct UpstashReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl UpstashReply {
    fn into_result(self) -> Result<Value, PasteError> {
        match self.error {
            Some(err) => Err(PasteError::Upstash(err)),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// Minimal Redis-over-HTTP client for the Upstash REST protocol.
#[derive(Clone)]
pub struct UpstashApi {
    client: reqwest::Client,
    base: Url,
    pipeline: Url,
    token: Arc<str>,
}

impl UpstashApi {
    pub fn new(base: Url, token: impl Into<Arc<str>>) -> Result<Self, PasteError> {
        let client = reqwest::Client::builder()
            .user_agent("paste-vercel/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;
        Self::with_client(client, base, token)
    }

    pub fn with_client(
        client: reqwest::Client,
        base: Url,
        token: impl Into<Arc<str>>,
    ) -> Result<Self, PasteError> {
        let mut dir = base.clone();
        if !dir.path().ends_with('/') {
            let path = format!("{}/", dir.path());
            dir.set_path(&path);
        }
        let pipeline = dir.join("pipeline")?;
        Ok(Self {
            client,
            base,
            pipeline,
            token: token.into(),
        })
    }

    /// Run one command, e.g. `["SET", "key", "value"]`.
    pub async fn command<S: AsRef<str>>(&self, args: &[S]) -> Result<Value, PasteError> {
        let body: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        let reply: UpstashReply = self.post(&self.base, &body).await?;
        reply.into_result()
    }

    /// Run several commands in one round trip; results come back in order.
    pub async fn pipeline(&self, commands: &[Vec<String>]) -> Result<Vec<Value>, PasteError> {
        if commands.is_empty() {
            return Ok(Vec::new());
        }
        let replies: Vec<UpstashReply> = self.post(&self.pipeline, commands).await?;
        replies.into_iter().map(UpstashReply::into_result).collect()
    }

    async fn post<B, T>(&self, url: &Url, body: &B) -> Result<T, PasteError>
    where
        B: serde::Serialize + ?Sized,
        T: serde::de::DeserializeOwned,
    {
        let resp = (|| async {
            let resp = self
                .client
                .post(url.clone())
                .bearer_auth(self.token.as_ref())
                .json(body)
                .send()
                .await?;
            if resp.status().is_server_error() {
                let status = resp.status();
                warn!("Upstash server error (will retry): {}", status);
                return match resp.error_for_status() {
                    Err(e) => Err(PasteError::Reqwest(e)),
                    Ok(_) => Err(PasteError::Upstash(format!("server error {status}"))),
                };
            }
            Ok(resp)
        })
        .retry(default_retry_policy())
        .when(|e: &PasteError| e.is_retryable())
        .await?;

        let status = resp.status();
        let bytes = resp.bytes().await?;
        if status.is_client_error() {
            let message = serde_json::from_slice::<UpstashReply>(&bytes)
                .ok()
                .and_then(|r| r.error)
                .unwrap_or_else(|| format!("request rejected with status {status}"));
            return Err(PasteError::Upstash(message));
        }
        Ok(serde_json::from_slice(&bytes)?)
    }
}
