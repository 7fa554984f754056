// Connection metadata captured from the request: client IP and user-agent

use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use std::convert::Infallible;
use std::net::SocketAddr;

const FORWARDED_FOR: &str = "x-forwarded-for";

/// IP address and user-agent of the calling client
///
/// Refresh tokens are bound to these values at issuance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionMetadata {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl ConnectionMetadata {
    pub fn new(ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip_address: Some(ip_address.into()),
            user_agent: Some(user_agent.into()),
        }
    }

    /// Read the forwarded-for header, falling back to the peer address
    pub fn from_headers(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let header_value = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(ToString::to_string)
        };

        Self {
            ip_address: header_value(FORWARDED_FOR).or_else(|| peer.map(|addr| addr.ip().to_string())),
            user_agent: header_value(header::USER_AGENT.as_str()),
        }
    }

    /// Both values, or an error when either one could not be determined
    pub fn binding(&self) -> Result<(&str, &str), ApiError> {
        match (self.ip_address.as_deref(), self.user_agent.as_deref()) {
            (Some(ip), Some(agent)) if !ip.is_empty() && !agent.is_empty() => Ok((ip, agent)),
            _ => Err(ApiError::InvalidArgument("Request not provided".to_string())),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for ConnectionMetadata
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Self::from_headers(&parts.headers, peer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static("forward-test"));
        headers.insert(header::USER_AGENT, HeaderValue::from_static("agent-test"));
        let peer: SocketAddr = "10.0.0.1:5000".parse().unwrap();

        let metadata = ConnectionMetadata::from_headers(&headers, Some(peer));

        assert_eq!(metadata, ConnectionMetadata::new("forward-test", "agent-test"));
    }

    #[test]
    fn test_falls_back_to_peer_address() {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static("agent-test"));
        let peer: SocketAddr = "10.0.0.1:5000".parse().unwrap();

        let metadata = ConnectionMetadata::from_headers(&headers, Some(peer));

        assert_eq!(metadata.ip_address.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_binding_requires_both_values() {
        assert!(ConnectionMetadata::new("1.2.3.4", "curl").binding().is_ok());
        assert!(ConnectionMetadata::default().binding().is_err());

        let no_agent = ConnectionMetadata::from_headers(&HeaderMap::new(), "10.0.0.1:1".parse().ok());
        let err = no_agent.binding().unwrap_err();
        assert_eq!(err.client_message(), "Request not provided");
    }
}
