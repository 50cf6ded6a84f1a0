//! SDK error conversion

use aws_sdk_cloudformation::config::http::HttpResponse;
use aws_sdk_cloudformation::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use sapling_cloud::CloudError;

/// Status used when the request never produced an HTTP response
pub const NO_RESPONSE: u16 = 0;

/// Turn an SDK failure into `CloudError::Provider`
///
/// Keeps the HTTP status of the response and the service's error code and
/// message. Dispatch and timeout failures carry [`NO_RESPONSE`].
pub(crate) fn provider_error<E>(err: SdkError<E, HttpResponse>) -> CloudError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let status = err
        .raw_response()
        .map(|r| r.status().as_u16())
        .unwrap_or(NO_RESPONSE);

    let message = match (err.code(), err.message()) {
        (Some(code), Some(message)) => format!("{}: {}", code, message),
        (Some(code), None) => code.to_string(),
        (None, Some(message)) => message.to_string(),
        (None, None) => DisplayErrorContext(&err).to_string(),
    };

    tracing::debug!("AWS request failed with status {}: {}", status, message);
    CloudError::provider(status, message)
}
