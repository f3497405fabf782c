//! Custom Axum extractors.
//!
//! - [`SessionCookie`]: the session ID from the `session_id` cookie, when
//!   present and well-formed.
//! - [`CorrelationId`]: the request correlation ID (header or generated).

use crate::state::SessionId;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, header::COOKIE, request::Parts},
};
use uuid::Uuid;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session_id";

/// The session ID presented by the client, if any.
///
/// Extraction never rejects: handlers that require authentication resolve
/// the cookie against the session store and return 401 themselves, so
/// open endpoints can use the same extractor to annotate responses for
/// logged-in viewers.
///
/// # Example
///
/// ```ignore
/// async fn handler(session: SessionCookie) -> String {
///     format!("Session: {:?}", session.0)
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SessionCookie(pub Option<SessionId>);

#[async_trait]
impl<S> FromRequestParts<S> for SessionCookie
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(extract_session_id(&parts.headers)))
    }
}

/// Parse the session ID out of the `Cookie` header.
fn extract_session_id(headers: &HeaderMap) -> Option<SessionId> {
    let cookies = headers.get(COOKIE)?.to_str().ok()?;

    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE {
            Uuid::parse_str(value.trim()).ok().map(SessionId)
        } else {
            None
        }
    })
}

/// Correlation ID for request tracing.
///
/// Extracts the correlation ID from the `X-Correlation-ID` header, or
/// generates a new UUID v4 if not present.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for CorrelationId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // The middleware stores the ID in extensions; fall back to the
        // header for routes mounted without the layer.
        let correlation_id = parts
            .extensions
            .get::<Self>()
            .map(|id| id.0)
            .or_else(|| {
                parts
                    .headers
                    .get("X-Correlation-ID")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| Uuid::parse_str(s).ok())
            })
            .unwrap_or_else(Uuid::new_v4);

        Ok(Self(correlation_id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn session_id_parses_from_cookie_header() {
        let id = Uuid::new_v4();
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("theme=dark; session_id={id}; lang=en")).unwrap(),
        );
        assert_eq!(extract_session_id(&headers), Some(SessionId(id)));
    }

    #[test]
    fn malformed_session_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("session_id=not-a-uuid"));
        assert_eq!(extract_session_id(&headers), None);
    }

    #[test]
    fn missing_cookie_header_yields_none() {
        assert_eq!(extract_session_id(&HeaderMap::new()), None);
    }
}
