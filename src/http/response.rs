//! Response normalization.
//!
//! # Responsibilities
//! - Buffer the backend body (bounded)
//! - Decode the upstream envelope, retrying through gzip when the
//!   backend declared `Content-Encoding: gzip`
//! - Re-serialize it as a caller envelope
//! - Fix up `Content-Type`, `Content-Length` and encoding headers
//!
//! # Design Decisions
//! - Decode failures never reach the caller; they degrade to an empty envelope
//! - The emitted body is always identity-encoded JSON, so any upstream
//!   `Content-Encoding` is dropped along with hop-by-hop headers
//! - Upstream status code and remaining headers pass through untouched

use std::io::Read;

use axum::body::{Body, Bytes};
use axum::http::header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, Response};
use flate2::read::GzDecoder;

use crate::error::DecodeError;
use crate::http::envelope::{CallerEnvelope, UpstreamEnvelope};
use crate::observability::metrics;

const FALLBACK_BODY: &[u8] = br#"{"success":false,"message":""}"#;

/// Connection-scoped headers that must not be relayed to the caller.
const HOP_BY_HOP: [&str; 7] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Rewrites upstream bodies into caller envelopes.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    max_body_bytes: usize,
}

impl Normalizer {
    pub fn new(max_body_bytes: usize) -> Self {
        Self { max_body_bytes }
    }

    /// Normalize a full upstream response.
    pub async fn normalize_response<B>(&self, response: Response<B>) -> Response<Body>
    where
        B: hyper::body::Body<Data = Bytes> + Send + 'static,
        B::Error: Into<axum::BoxError>,
    {
        let (mut parts, body) = response.into_parts();

        let raw = match axum::body::to_bytes(Body::new(body), self.max_body_bytes).await {
            Ok(bytes) => bytes,
            Err(e) => {
                let err = DecodeError::Read(e.to_string());
                tracing::warn!(error = %err, status = %parts.status, "Treating upstream body as empty");
                metrics::record_normalize_fallback("read");
                Bytes::new()
            }
        };

        let (body, headers) = self.normalize(&raw, &parts.headers);
        parts.headers = headers;
        Response::from_parts(parts, Body::from(body))
    }

    /// Turn a raw upstream body into a caller envelope body and the headers
    /// that must accompany it.
    pub fn normalize(&self, raw: &[u8], headers: &HeaderMap) -> (Bytes, HeaderMap) {
        let upstream = match self.decode(raw, headers) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(error = %e, body_len = raw.len(), "Upstream envelope decode failed");
                metrics::record_normalize_fallback(match e {
                    DecodeError::Json(_) => "json",
                    DecodeError::Gzip(_) => "gzip",
                    DecodeError::Read(_) => "read",
                });
                UpstreamEnvelope::default()
            }
        };
        tracing::debug!(envelope = ?upstream, "Upstream envelope");

        let caller = CallerEnvelope::from(upstream);
        let body = match serde_json::to_vec(&caller) {
            Ok(body) => Bytes::from(body),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize caller envelope");
                Bytes::from_static(FALLBACK_BODY)
            }
        };
        tracing::debug!(envelope = ?caller, "Caller envelope");

        let mut out = headers.clone();
        out.remove(CONTENT_ENCODING);
        for name in HOP_BY_HOP {
            out.remove(name);
        }
        out.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        out.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));

        (body, out)
    }

    fn decode(&self, raw: &[u8], headers: &HeaderMap) -> Result<UpstreamEnvelope, DecodeError> {
        match serde_json::from_slice(raw) {
            Ok(envelope) => Ok(envelope),
            Err(e) if is_gzip(headers) => {
                tracing::debug!(error = %e, "Plain decode failed, retrying as gzip");
                let inflated = self.gunzip(raw)?;
                Ok(serde_json::from_slice(&inflated)?)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn gunzip(&self, raw: &[u8]) -> Result<Vec<u8>, DecodeError> {
        let limit = self.max_body_bytes as u64;
        let mut out = Vec::new();
        GzDecoder::new(raw)
            .take(limit + 1)
            .read_to_end(&mut out)
            .map_err(DecodeError::Gzip)?;

        if out.len() as u64 > limit {
            return Err(DecodeError::Gzip(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("decompressed body exceeds {} bytes", limit),
            )));
        }
        Ok(out)
    }
}

fn is_gzip(headers: &HeaderMap) -> bool {
    headers
        .get_all(CONTENT_ENCODING)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.to_ascii_lowercase().contains("gzip"))
}
