//! Replayable message bodies.
//!
//! HTTP bodies are single-pass streams. [`BufferedBody`] drains one into
//! memory once so that any number of rules can read it, and keeps the
//! declared length in lockstep with the bytes: [`BufferedBody::replace`]
//! is the only mutator and swaps both together.

use bytes::Bytes;
use http::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, TRANSFER_ENCODING};
use http_body::Body;
use http_body_util::{BodyExt, Full};
use thiserror::Error;

/// A body left unbuffered because it is larger than the limit.
///
/// Carries the untouched body so that it can still be forwarded.
#[derive(Debug, Error)]
#[error("body of {size} bytes exceeds the {limit} byte limit")]
pub struct OversizedBody {
    /// The original body.
    pub body: Full<Bytes>,
    /// Size reported by the body.
    pub size: u64,
    /// The configured limit in bytes.
    pub limit: usize,
}

/// An in-memory, replayable body.
///
/// # Example
///
/// ```
/// use hermes_middleware::BufferedBody;
///
/// let mut body = BufferedBody::new("{\"a\":1}");
/// assert_eq!(body.len(), 7);
/// assert!(!body.is_rewritten());
///
/// body.replace("{}");
/// assert_eq!(body.len(), 2);
/// assert!(body.is_rewritten());
/// assert_eq!(body.as_text(), Some("{}"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferedBody {
    bytes: Bytes,
    declared_len: usize,
    rewritten: bool,
}

impl BufferedBody {
    /// Wraps bytes that are already in memory.
    #[must_use]
    pub fn new(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            declared_len: bytes.len(),
            bytes,
            rewritten: false,
        }
    }

    /// Drains a pipeline body into memory.
    ///
    /// # Errors
    ///
    /// Returns [`OversizedBody`], holding the body unread, when it is larger
    /// than `limit` bytes.
    pub async fn collect(body: Full<Bytes>, limit: usize) -> Result<Self, OversizedBody> {
        let size = body.size_hint().lower();
        if size > limit as u64 {
            return Err(OversizedBody { body, size, limit });
        }

        let bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };
        Ok(Self::new(bytes))
    }

    /// Returns the buffered bytes. Cloning them is cheap.
    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Returns the declared length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declared_len
    }

    /// Returns true if the body holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declared_len == 0
    }

    /// Returns true if the body is empty or only whitespace.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.bytes.iter().all(u8::is_ascii_whitespace)
    }

    /// Returns the body as UTF-8 text, if it is valid UTF-8.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    /// Replaces the bytes and the declared length together.
    pub fn replace(&mut self, bytes: impl Into<Bytes>) {
        let bytes = bytes.into();
        self.declared_len = bytes.len();
        self.bytes = bytes;
        self.rewritten = true;
    }

    /// Returns true once [`replace`](Self::replace) has run.
    #[must_use]
    pub fn is_rewritten(&self) -> bool {
        self.rewritten
    }

    /// Makes the framing headers in `headers` describe this body.
    ///
    /// A body that was never rewritten leaves `headers` alone. A rewritten
    /// one gets an exact `Content-Length`, and any `Transfer-Encoding` is
    /// dropped since the two must not appear together.
    pub fn sync_content_length(&self, headers: &mut HeaderMap) {
        if !self.rewritten {
            return;
        }
        headers.remove(TRANSFER_ENCODING);
        headers.insert(CONTENT_LENGTH, HeaderValue::from(self.declared_len));
    }

    /// Converts into a body for a rebuilt request or response.
    #[must_use]
    pub fn into_full(self) -> Full<Bytes> {
        Full::new(self.bytes)
    }
}
