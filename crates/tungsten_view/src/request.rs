//! Pending data sources.
//!
//! A request is any `Future<Output = Result<D, E>>`; `render` awaits it
//! exactly once. The constructors here cover the common sources: values
//! already in hand, values that arrive after a delay, and JSON payloads.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::RequestError;

/// A request that resolves immediately with `data`.
pub fn resolved<D, E>(data: D) -> impl Future<Output = Result<D, E>> + Send
where
    D: Send,
    E: Send,
{
    std::future::ready(Ok(data))
}

/// A request that rejects immediately with `error`.
pub fn rejected<D, E>(error: E) -> impl Future<Output = Result<D, E>> + Send
where
    D: Send,
    E: Send,
{
    std::future::ready(Err(error))
}

/// A request that settles with `result` once `delay` has elapsed.
pub fn delayed<D, E>(
    delay: Duration,
    result: Result<D, E>,
) -> impl Future<Output = Result<D, E>> + Send
where
    D: Send,
    E: Send,
{
    async move {
        tokio::time::sleep(delay).await;
        result
    }
}

/// A request that reads `path` and parses it as JSON.
pub fn from_json_file<T>(
    path: impl AsRef<Path>,
) -> impl Future<Output = Result<T, RequestError>> + Send
where
    T: DeserializeOwned + Send,
{
    let path = path.as_ref().to_path_buf();
    async move {
        debug!("Loading data from {:?}", path);
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| RequestError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// A request that parses an in-memory JSON payload.
pub fn from_json_str<T>(text: &str) -> impl Future<Output = Result<T, RequestError>> + Send
where
    T: DeserializeOwned + Send,
{
    std::future::ready(serde_json::from_str(text).map_err(RequestError::from))
}
