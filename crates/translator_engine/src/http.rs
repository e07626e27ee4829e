use async_trait::async_trait;
use futures_util::{stream, StreamExt};
use reqwest::{Response, Url};

use crate::{
    ChatRequest, ConnectionError, FragmentStream, InferenceConnection, InferenceConnector,
    LoadModelRequest, RemoteCallError, ServiceSettings, Utf8Assembler,
};

const HEALTH_PATH: &str = "health";
const LOAD_MODEL_PATH: &str = "v1/models/load";
const CHAT_PATH: &str = "v1/chat";
const CONFIG_PATH: &str = "v1/config";

/// Reaches the inference service over HTTP. A chat reply is the streamed response body.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    settings: ServiceSettings,
}

impl HttpConnector {
    pub fn new(settings: ServiceSettings) -> Self {
        Self { settings }
    }

    fn base_url(&self) -> Result<Url, ConnectionError> {
        let raw = if self.settings.base_url.ends_with('/') {
            self.settings.base_url.clone()
        } else {
            format!("{}/", self.settings.base_url)
        };
        Url::parse(&raw).map_err(|err| ConnectionError::InvalidAddress {
            address: self.settings.base_url.clone(),
            message: err.to_string(),
        })
    }

    fn build_client(&self) -> Result<reqwest::Client, ConnectionError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| ConnectionError::Unreachable(err.to_string()))
    }
}

#[async_trait]
impl InferenceConnector for HttpConnector {
    async fn connect(&self) -> Result<Box<dyn InferenceConnection>, ConnectionError> {
        let base = self.base_url()?;
        let client = self.build_client()?;
        let health = join(&base, HEALTH_PATH).map_err(|message| ConnectionError::InvalidAddress {
            address: base.to_string(),
            message,
        })?;

        let response = client
            .get(health)
            .timeout(self.settings.connect_timeout)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ConnectionError::Timeout(self.settings.connect_timeout)
                } else {
                    ConnectionError::Unreachable(err.to_string())
                }
            })?;
        if !response.status().is_success() {
            return Err(ConnectionError::Unhealthy(response.status().as_u16()));
        }

        Ok(Box::new(HttpConnection {
            client: Some(client),
            base,
        }))
    }
}

struct HttpConnection {
    client: Option<reqwest::Client>,
    base: Url,
}

impl HttpConnection {
    fn client(&self) -> Result<&reqwest::Client, RemoteCallError> {
        self.client.as_ref().ok_or(RemoteCallError::Disconnected)
    }

    fn url(&self, path: &str) -> Result<Url, RemoteCallError> {
        join(&self.base, path).map_err(RemoteCallError::Transport)
    }
}

#[async_trait]
impl InferenceConnection for HttpConnection {
    async fn load_model(&mut self, request: &LoadModelRequest) -> Result<(), RemoteCallError> {
        let url = self.url(LOAD_MODEL_PATH)?;
        let response = self
            .client()?
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn chat(&mut self, request: &ChatRequest) -> Result<FragmentStream, RemoteCallError> {
        let url = self.url(CHAT_PATH)?;
        let response = self
            .client()?
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;
        Ok(fragment_stream(response))
    }

    async fn client_config(&mut self) -> Result<String, RemoteCallError> {
        let url = self.url(CONFIG_PATH)?;
        let response = self
            .client()?
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let response = ensure_success(response).await?;
        response.text().await.map_err(map_reqwest_error)
    }

    fn disconnect(&mut self) {
        self.client = None;
    }
}

fn join(base: &Url, path: &str) -> Result<Url, String> {
    base.join(path).map_err(|err| err.to_string())
}

async fn ensure_success(response: Response) -> Result<Response, RemoteCallError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = if body.is_empty() {
        status.to_string()
    } else {
        body
    };
    Err(RemoteCallError::Status {
        status: status.as_u16(),
        message,
    })
}

/// Body chunks as text fragments; a UTF-8 sequence split across chunks is reassembled.
fn fragment_stream(response: Response) -> FragmentStream {
    let chunks = Box::pin(response.bytes_stream());
    stream::unfold(Some((chunks, Utf8Assembler::new())), |state| async move {
        let (mut chunks, mut assembler) = state?;
        match chunks.next().await {
            Some(Ok(bytes)) => {
                let fragment = assembler.push(&bytes);
                Some((Ok(fragment), Some((chunks, assembler))))
            }
            Some(Err(err)) => Some((Err(map_reqwest_error(err)), None)),
            None if assembler.has_pending() => Some((Ok(assembler.finish()), None)),
            None => None,
        }
    })
    .boxed()
}

fn map_reqwest_error(err: reqwest::Error) -> RemoteCallError {
    if err.is_timeout() {
        return RemoteCallError::Timeout;
    }
    RemoteCallError::Transport(err.to_string())
}
