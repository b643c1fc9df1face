use std::future::Future;
use std::time::Duration;

/// Failure talking to a live data provider. Never escapes a source: every variant is
/// converted into a fallback reading plus a degradation log.
#[derive(Debug, thiserror::Error)]
pub(crate) enum ProviderError {
    #[error("transport failure: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider answered with HTTP {0}")]
    Status(u16),
    #[error("malformed provider payload: {0}")]
    MalformedPayload(String),
    #[error("no response within {0:?}")]
    Timeout(Duration),
}

/// Runs a provider call under a fixed deadline. There is no retry.
pub(crate) async fn bounded<T, F>(timeout: Duration, call: F) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| ProviderError::Timeout(timeout))?
}
