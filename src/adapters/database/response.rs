//! Raw point-read responses
//!
//! A [`RawItemResponse`] carries the status of a point read and an
//! undecoded body. Decoding only happens when the caller asks for the
//! document. The response owns a transport resource which is released
//! exactly once: explicitly via [`RawItemResponse::release`], implicitly when
//! the document is taken, or on drop, whichever comes first.

use crate::domain::{CosmosDbError, HearthError, Result};
use std::fmt;

type BodyDecoder<T> = Box<dyn FnOnce() -> Result<T> + Send>;
type ReleaseHook = Box<dyn FnOnce() + Send>;

/// Status code of a successful point read
pub const STATUS_OK: u16 = 200;

/// Status code of an absent item
pub const STATUS_NOT_FOUND: u16 = 404;

/// Raw response of a point read
pub struct RawItemResponse<T> {
    status: u16,
    request_charge: f64,
    message: Option<String>,
    body: Option<BodyDecoder<T>>,
    release_hook: Option<ReleaseHook>,
    released: bool,
}

impl<T> RawItemResponse<T> {
    /// A successful response whose body is decoded by `decode` on demand
    pub fn found(request_charge: f64, decode: impl FnOnce() -> Result<T> + Send + 'static) -> Self {
        Self {
            status: STATUS_OK,
            request_charge,
            message: None,
            body: Some(Box::new(decode)),
            release_hook: None,
            released: false,
        }
    }

    /// A response without a body
    pub fn status_only(status: u16, request_charge: f64, message: impl Into<String>) -> Self {
        Self {
            status,
            request_charge,
            message: Some(message.into()),
            body: None,
            release_hook: None,
            released: false,
        }
    }

    /// Registers a hook run when the underlying resource is released
    pub fn with_release_hook(mut self, hook: impl FnOnce() + Send + 'static) -> Self {
        self.release_hook = Some(Box::new(hook));
        self
    }

    /// HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the status is 404
    pub fn is_not_found(&self) -> bool {
        self.status == STATUS_NOT_FOUND
    }

    /// Request units consumed by the read
    pub fn request_charge(&self) -> f64 {
        self.request_charge
    }

    /// Whether the resource has been released
    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Converts a non-success status into the matching store error
    pub fn to_error(&self) -> HearthError {
        let message = self
            .message
            .clone()
            .unwrap_or_else(|| format!("point read returned status {}", self.status));
        CosmosDbError::from_status(self.status, message).into()
    }

    /// Decodes the body and releases the resource
    ///
    /// # Errors
    ///
    /// Returns an error if the response was not successful, has no body, has
    /// already been released, or the body does not decode.
    pub fn into_document(mut self) -> Result<T> {
        if !self.is_success() {
            let err = self.to_error();
            self.release();
            return Err(err);
        }
        let decode = self.body.take();
        let result = match decode {
            Some(decode) => decode(),
            None => Err(CosmosDbError::DeserializationFailed(
                "response body is no longer available".to_string(),
            )
            .into()),
        };
        self.release();
        result
    }

    /// Releases the underlying resource; repeated calls are no-ops
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.body = None;
        if let Some(hook) = self.release_hook.take() {
            hook();
        }
    }
}

impl<T> Drop for RawItemResponse<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> fmt::Debug for RawItemResponse<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawItemResponse")
            .field("status", &self.status)
            .field("request_charge", &self.request_charge)
            .field("released", &self.released)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_hook(counter: &Arc<AtomicUsize>) -> impl FnOnce() + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_release_is_idempotent() {
        let releases = Arc::new(AtomicUsize::new(0));
        let mut response: RawItemResponse<String> =
            RawItemResponse::status_only(404, 1.0, "missing").with_release_hook(counting_hook(&releases));

        response.release();
        response.release();
        drop(response);

        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases() {
        let releases = Arc::new(AtomicUsize::new(0));
        {
            let _response: RawItemResponse<String> =
                RawItemResponse::found(1.0, || Ok("body".to_string()))
                    .with_release_hook(counting_hook(&releases));
        }
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_into_document_decodes_lazily_and_releases() {
        let decoded = Arc::new(AtomicUsize::new(0));
        let releases = Arc::new(AtomicUsize::new(0));
        let decoded_clone = Arc::clone(&decoded);

        let response = RawItemResponse::found(2.5, move || {
            decoded_clone.fetch_add(1, Ordering::SeqCst);
            Ok(42)
        })
        .with_release_hook(counting_hook(&releases));

        assert_eq!(decoded.load(Ordering::SeqCst), 0);
        assert_eq!(response.into_document().unwrap(), 42);
        assert_eq!(decoded.load(Ordering::SeqCst), 1);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_status_maps_to_error() {
        let response: RawItemResponse<String> = RawItemResponse::status_only(429, 0.0, "slow down");
        assert!(!response.is_success());
        let err = response.into_document().unwrap_err();
        assert_eq!(err.status(), Some(429));
    }

    #[test]
    fn test_released_response_cannot_decode() {
        let mut response = RawItemResponse::found(1.0, || Ok(1));
        response.release();
        assert!(response.is_released());
        assert!(response.into_document().is_err());
    }
}
