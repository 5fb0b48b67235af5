//! Default [`HttpTransport`] backed by `reqwest`.

use std::collections::HashMap;
use std::sync::Arc;
use std::task::Poll;

use async_trait::async_trait;
use futures_util::StreamExt;
use log::debug;
use reqwest::{Client, Method};
use tokio_util::sync::CancellationToken;

use crate::error::LLMError;

use super::{
    DEFAULT_TIMEOUT, DynHttpTransport, HttpBodyStream, HttpMethod, HttpRequest, HttpResponse,
    HttpStreamResponse, HttpTransport,
};

/// Reqwest-backed transport. The inner client's connection pool is shared across
/// requests; this type is cheap to clone behind an `Arc`.
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Wraps a custom `reqwest::Client`.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a transport with default client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LLMError::Transport`] when the TLS backend fails to initialize.
    pub fn default_client() -> Result<Self, LLMError> {
        Client::builder()
            .build()
            .map(Self::new)
            .map_err(|err| LLMError::transport(format!("failed to create reqwest client: {err}")))
    }

    fn method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        }
    }

    fn build_request(&self, mut request: HttpRequest) -> Result<reqwest::RequestBuilder, LLMError> {
        let method = Self::method(request.method);
        let mut builder = self.client.request(method, &request.url);

        builder = builder.timeout(request.timeout.unwrap_or(DEFAULT_TIMEOUT));

        for (name, value) in request.headers.drain() {
            let header_name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| LLMError::transport(format!("invalid header name: {err}")))?;
            let header_value = reqwest::header::HeaderValue::from_str(&value).map_err(|err| {
                LLMError::transport(format!("invalid header value for {header_name}: {err}"))
            })?;
            builder = builder.header(header_name, header_value);
        }

        if let Some(body) = request.body.take() {
            builder = builder.body(body);
        }

        Ok(builder)
    }

    fn headers_to_map(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect()
    }
}

async fn dispatch(
    builder: reqwest::RequestBuilder,
    cancel: Option<&CancellationToken>,
) -> Result<reqwest::Response, LLMError> {
    match cancel {
        Some(token) => tokio::select! {
            _ = token.cancelled() => Err(aborted()),
            result = builder.send() => result.map_err(|err| LLMError::transport(err.to_string())),
        },
        None => builder
            .send()
            .await
            .map_err(|err| LLMError::transport(err.to_string())),
    }
}

fn aborted() -> LLMError {
    LLMError::Aborted {
        message: "cancellation token fired".to_string(),
    }
}

/// Ends the body stream with an abort error once the token fires, so the decode loop
/// observes a read failure instead of a clean close.
fn poison_on_cancel(body: HttpBodyStream, token: CancellationToken) -> HttpBodyStream {
    let guard = token.clone();
    let mut reported = false;
    let tail = futures_util::stream::poll_fn(move |_| {
        if guard.is_cancelled() && !reported {
            reported = true;
            Poll::Ready(Some(Err(aborted())))
        } else {
            Poll::Ready(None)
        }
    });
    Box::pin(body.take_until(Box::pin(token.cancelled_owned())).chain(tail))
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, LLMError> {
        let cancel = request.cancel.clone();
        let url = request.url.clone();
        let builder = self.build_request(request)?;
        let response = dispatch(builder, cancel.as_ref()).await?;

        let status = response.status().as_u16();
        debug!("POST {url} -> {status}");
        let headers = Self::headers_to_map(response.headers());
        let bytes = match cancel {
            Some(token) => tokio::select! {
                _ = token.cancelled() => return Err(aborted()),
                result = response.bytes() => result,
            },
            None => response.bytes().await,
        }
        .map_err(|err| LLMError::transport(err.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body: bytes.to_vec(),
        })
    }

    async fn send_stream(&self, request: HttpRequest) -> Result<HttpStreamResponse, LLMError> {
        let cancel = request.cancel.clone();
        let url = request.url.clone();
        let builder = self.build_request(request)?;
        let response = dispatch(builder, cancel.as_ref()).await?;

        let status = response.status().as_u16();
        debug!("POST {url} -> {status} (streaming)");
        let headers = Self::headers_to_map(response.headers());
        let stream = response.bytes_stream().map(|chunk| {
            chunk
                .map(|bytes| bytes.to_vec())
                .map_err(|err| LLMError::transport(err.to_string()))
        });
        let body: HttpBodyStream = match cancel {
            Some(token) => poison_on_cancel(Box::pin(stream), token),
            None => Box::pin(stream),
        };

        Ok(HttpStreamResponse {
            status,
            headers,
            body,
        })
    }
}

/// Convenience constructor for a thread-safe default transport.
///
/// # Errors
///
/// Returns [`LLMError::Transport`] when the underlying client cannot be built.
pub fn default_dyn_transport() -> Result<DynHttpTransport, LLMError> {
    Ok(Arc::new(ReqwestTransport::default_client()?))
}
