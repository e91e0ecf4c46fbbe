//! Matrix client-server API wrapper.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::events::{SyncBatch, SyncResponse, collect_events};
use super::{Connector, MatrixError, RateLimiter, RoomId};
use crate::config::{ConnectorConfig, MatrixConfig};

/// Prefix of every client-server endpoint.
const CLIENT_API: &str = "/_matrix/client/v3";

/// Slack added on top of the long-poll timeout for the HTTP request itself.
const REQUEST_TIMEOUT_SLACK: Duration = Duration::from_secs(30);

/// Standard Matrix error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errcode: String,

    #[serde(default)]
    error: String,

    #[serde(default)]
    retry_after_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct WhoAmI {
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct ResolvedAlias {
    room_id: String,
}

/// Matrix client bound to one account.
pub struct MatrixClient {
    http: reqwest::Client,

    /// Homeserver base URL without trailing slash.
    homeserver: String,

    access_token: String,

    user_id: String,

    connector_config: ConnectorConfig,

    /// Rate limiter for outgoing messages.
    rate_limiter: RateLimiter,

    /// Counter mixed into transaction ids.
    txn_counter: AtomicU64,
}

impl MatrixClient {
    /// Connects to the homeserver and verifies the access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the token is rejected.
    pub async fn connect(
        config: &MatrixConfig,
        connector_config: ConnectorConfig,
        sync_timeout: Duration,
        min_send_interval_ms: u64,
    ) -> Result<Self, MatrixError> {
        info!("Connecting to {}...", config.homeserver_url);

        let http = reqwest::Client::builder()
            .timeout(sync_timeout + REQUEST_TIMEOUT_SLACK)
            .user_agent(concat!("invite_bot/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut client = Self {
            http,
            homeserver: config.homeserver_url.trim_end_matches('/').to_owned(),
            access_token: config.access_token.clone(),
            user_id: String::new(),
            connector_config,
            rate_limiter: RateLimiter::from_millis(min_send_interval_ms),
            txn_counter: AtomicU64::new(0),
        };

        let resp = client
            .request(Method::GET, "/account/whoami")
            .send()
            .await?;
        let whoami: WhoAmI = Self::decode(resp).await.map_err(|e| match e {
            MatrixError::Api { message, .. } => MatrixError::NotAuthorized(message),
            other => other,
        })?;

        info!("Connected as {}", whoami.user_id);
        client.user_id = whoami.user_id;
        Ok(client)
    }

    /// Performs one `/sync` long-poll.
    ///
    /// Timeline messages are only reported once a `since` token exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body cannot be decoded.
    pub async fn sync(
        &self,
        since: Option<&str>,
        timeout: Duration,
    ) -> Result<SyncBatch, MatrixError> {
        let timeout_ms = timeout.as_millis().to_string();
        let mut query = vec![("timeout", timeout_ms.as_str())];
        if let Some(token) = since {
            query.push(("since", token));
        }

        let resp = self
            .request(Method::GET, "/sync")
            .query(&query)
            .send()
            .await?;
        let body: SyncResponse = Self::decode(resp).await?;

        Ok(collect_events(body, &self.user_id, since.is_some()))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{CLIENT_API}{path}", self.homeserver))
            .bearer_auth(&self.access_token)
    }

    /// Turns a response into `T`, or into the matching `MatrixError`.
    async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, MatrixError> {
        let status = resp.status();
        if status.is_success() {
            return resp
                .json()
                .await
                .map_err(|e| MatrixError::Decode(e.to_string()));
        }

        let text = resp.text().await.unwrap_or_default();
        Err(error_from_body(status, &text))
    }

    fn next_txn_id(&self) -> String {
        let seq = self.txn_counter.fetch_add(1, Ordering::Relaxed);
        format!("{}.{seq}", chrono::Utc::now().timestamp_millis())
    }
}

#[async_trait]
impl Connector for MatrixClient {
    fn own_user_id(&self) -> &str {
        &self.user_id
    }

    fn config(&self) -> &ConnectorConfig {
        &self.connector_config
    }

    async fn join_room(&self, room_id: &RoomId) -> Result<(), MatrixError> {
        debug!("Joining {}", room_id);

        let path = format!("/rooms/{}/join", urlencoding::encode(room_id.as_str()));
        let resp = self
            .request(Method::POST, &path)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let _: serde_json::Value = Self::decode(resp).await?;
        Ok(())
    }

    async fn resolve_room_alias(&self, alias: &str) -> Result<RoomId, MatrixError> {
        debug!("Resolving room alias {}", alias);

        let path = format!("/directory/room/{}", urlencoding::encode(alias));
        let resp = self.request(Method::GET, &path).send().await?;
        let resolved: ResolvedAlias = Self::decode(resp).await?;
        Ok(RoomId::new(resolved.room_id))
    }

    async fn send_text(&self, room_id: &RoomId, body: &str) -> Result<(), MatrixError> {
        let waited = self.rate_limiter.wait_and_acquire().await;
        if !waited.is_zero() {
            debug!("Waited {:?} for rate limit", waited);
        }

        let path = format!(
            "/rooms/{}/send/m.room.message/{}",
            urlencoding::encode(room_id.as_str()),
            urlencoding::encode(&self.next_txn_id())
        );
        let content = serde_json::json!({
            "msgtype": "m.text",
            "body": body,
        });

        let resp = self
            .request(Method::PUT, &path)
            .json(&content)
            .send()
            .await?;

        match Self::decode::<serde_json::Value>(resp).await {
            Ok(_) => Ok(()),
            Err(MatrixError::RateLimited(retry_after_ms)) => {
                self.rate_limiter.handle_rate_limited(retry_after_ms).await;
                Err(MatrixError::RateLimited(retry_after_ms))
            }
            Err(e) => Err(e),
        }
    }
}

impl std::fmt::Debug for MatrixClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatrixClient")
            .field("homeserver", &self.homeserver)
            .field("user_id", &self.user_id)
            .field("rate_limiter", &self.rate_limiter)
            .finish_non_exhaustive()
    }
}

/// Maps a non-success response body to a `MatrixError`.
fn error_from_body(status: StatusCode, text: &str) -> MatrixError {
    let parsed: Option<ErrorBody> = serde_json::from_str(text).ok();

    if status == StatusCode::TOO_MANY_REQUESTS
        || parsed.as_ref().is_some_and(|b| b.errcode == "M_LIMIT_EXCEEDED")
    {
        let retry_after_ms = parsed.and_then(|b| b.retry_after_ms).unwrap_or(1000);
        return MatrixError::RateLimited(retry_after_ms);
    }

    match parsed {
        Some(body) => MatrixError::Api {
            status: status.as_u16(),
            errcode: body.errcode,
            message: body.error,
        },
        None => MatrixError::Api {
            status: status.as_u16(),
            errcode: "M_UNKNOWN".to_owned(),
            message: truncate_for_log(text, 200),
        },
    }
}

/// Truncates a string for logging purposes.
fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_owned()
    } else {
        format!("{}...", s.chars().take(max_len).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_body_api() {
        let err = error_from_body(
            StatusCode::NOT_FOUND,
            r#"{"errcode":"M_NOT_FOUND","error":"Room alias #nope:example.org not found."}"#,
        );
        match err {
            MatrixError::Api {
                status,
                errcode,
                message,
            } => {
                assert_eq!(status, 404);
                assert_eq!(errcode, "M_NOT_FOUND");
                assert_eq!(message, "Room alias #nope:example.org not found.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_from_body_rate_limited() {
        let err = error_from_body(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"errcode":"M_LIMIT_EXCEEDED","error":"Too many requests","retry_after_ms":2000}"#,
        );
        assert!(matches!(err, MatrixError::RateLimited(2000)));

        let err = error_from_body(StatusCode::TOO_MANY_REQUESTS, "");
        assert!(matches!(err, MatrixError::RateLimited(1000)));
    }

    #[test]
    fn test_error_from_body_not_json() {
        let err = error_from_body(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert_eq!(err.status_code(), Some(502));
        assert!(err.to_string().contains("bad gateway"));
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("Hello", 10), "Hello");
        assert_eq!(truncate_for_log("Hello, World!", 5), "Hello...");
    }
}
