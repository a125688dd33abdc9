//! HTTP client forwarding validated requests to the ShareIt server

use std::time::Duration;

use axum::{
    http::{header::CONTENT_TYPE, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;

use crate::{
    api::{SharerId, SHARER_HEADER},
    config::GatewayConfig,
    error::{AppError, AppResult},
};

#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    server_url: String,
}

impl GatewayClient {
    pub fn new(config: &GatewayConfig) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            server_url: config.server_url.trim_end_matches('/').to_string(),
        })
    }

    /// Server URL for the same path and query the gateway received
    pub fn target(&self, uri: &Uri) -> String {
        let path = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        format!("{}{}", self.server_url, path)
    }

    /// Forward a request without a body
    pub async fn forward(&self, method: Method, uri: &Uri, sharer: Option<SharerId>) -> AppResult<Response> {
        let request = self.request(method, uri, sharer);
        self.send(request).await
    }

    /// Forward a request with a JSON body
    pub async fn forward_json<B>(
        &self,
        method: Method,
        uri: &Uri,
        sharer: Option<SharerId>,
        body: &B,
    ) -> AppResult<Response>
    where
        B: Serialize + ?Sized,
    {
        let request = self.request(method, uri, sharer).json(body);
        self.send(request).await
    }

    fn request(&self, method: Method, uri: &Uri, sharer: Option<SharerId>) -> RequestBuilder {
        let url = self.target(uri);
        tracing::debug!(%method, %url, "Forwarding request");

        let request = self.http.request(method, url);
        match sharer {
            Some(SharerId(id)) => request.header(SHARER_HEADER, id),
            None => request,
        }
    }

    /// Relay the server's status and JSON body unchanged
    async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        let response = request.send().await?;
        let status = StatusCode::from_u16(response.status().as_u16())
            .map_err(|e| AppError::Internal(format!("Invalid upstream status: {}", e)))?;
        let body = response.bytes().await?;

        if status.is_server_error() {
            tracing::warn!(%status, "Server answered with an error");
        }

        if body.is_empty() {
            return Ok(status.into_response());
        }
        Ok((status, [(CONTENT_TYPE, "application/json")], body).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server_url: &str) -> GatewayClient {
        GatewayClient::new(&GatewayConfig {
            server_url: server_url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_target_keeps_path_and_query() {
        let uri: Uri = "/bookings/owner?state=PAST&from=0&size=5".parse().unwrap();
        assert_eq!(
            client("http://server:9090/").target(&uri),
            "http://server:9090/bookings/owner?state=PAST&from=0&size=5"
        );
    }

    #[test]
    fn test_target_without_query() {
        let uri: Uri = "/users/3".parse().unwrap();
        assert_eq!(client("http://server:9090").target(&uri), "http://server:9090/users/3");
    }
}
