//! Typed, read-only access to course content.

use async_trait::async_trait;
use lectern_types::{Assignment, ContentId, Course, Grade, Lecture, ModuleSummary, UnlockStatus};
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::error_message_from_body;
use crate::{FetchError, LecternClient, encode_segment};

/// Remote content operations consumed by the navigator.
///
/// Implementations must be cheap to share across tasks; the navigator's
/// effect runner fans out per-module requests concurrently.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// `GET /courses/{courseId}`
    async fn course(&self, course_id: &str) -> Result<Course, FetchError>;

    /// `GET /courses/{courseId}/modules`
    async fn modules(&self, course_id: &str) -> Result<Vec<ModuleSummary>, FetchError>;

    /// `GET /courses/{courseId}/modules/progress/{userId}`
    async fn unlock_status(&self, course_id: &str, user_id: &str) -> Result<Vec<UnlockStatus>, FetchError>;

    /// `GET /modules/{moduleId}/lectures`
    async fn lectures(&self, module_id: &ContentId) -> Result<Vec<Lecture>, FetchError>;

    /// `GET /modules/{moduleId}/assignments`
    async fn assignments(&self, module_id: &ContentId) -> Result<Vec<Assignment>, FetchError>;

    /// `GET /api/grades/{userId}`
    async fn grades(&self, user_id: &str) -> Result<Vec<Grade>, FetchError>;
}

/// [`ContentSource`] backed by the HTTP API.
#[derive(Debug, Clone)]
pub struct HttpContentSource {
    client: LecternClient,
}

impl HttpContentSource {
    pub fn new(client: LecternClient) -> Self {
        Self { client }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: String) -> Result<T, FetchError> {
        let response = self
            .client
            .request(Method::GET, &path)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                path: path.clone(),
                source,
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|source| FetchError::Transport {
            path: path.clone(),
            source,
        })?;
        debug!(%path, status = status.as_u16(), bytes = body.len(), "content response");

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                path,
                message: error_message_from_body(&body),
            });
        }

        serde_json::from_str(&body).map_err(|source| FetchError::Decode { path, source })
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn course(&self, course_id: &str) -> Result<Course, FetchError> {
        self.get_json(format!("/courses/{}", encode_segment(course_id))).await
    }

    async fn modules(&self, course_id: &str) -> Result<Vec<ModuleSummary>, FetchError> {
        self.get_json(format!("/courses/{}/modules", encode_segment(course_id)))
            .await
    }

    async fn unlock_status(&self, course_id: &str, user_id: &str) -> Result<Vec<UnlockStatus>, FetchError> {
        self.get_json(format!(
            "/courses/{}/modules/progress/{}",
            encode_segment(course_id),
            encode_segment(user_id)
        ))
        .await
    }

    async fn lectures(&self, module_id: &ContentId) -> Result<Vec<Lecture>, FetchError> {
        self.get_json(format!("/modules/{}/lectures", encode_segment(module_id.as_str())))
            .await
    }

    async fn assignments(&self, module_id: &ContentId) -> Result<Vec<Assignment>, FetchError> {
        self.get_json(format!("/modules/{}/assignments", encode_segment(module_id.as_str())))
            .await
    }

    async fn grades(&self, user_id: &str) -> Result<Vec<Grade>, FetchError> {
        self.get_json(format!("/api/grades/{}", encode_segment(user_id))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        // Port 9 (discard) is not expected to accept HTTP connections.
        let client = LecternClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let source = HttpContentSource::new(client);
        match source.course("CS101").await {
            Err(FetchError::Transport { path, .. }) => assert_eq!(path, "/courses/CS101"),
            other => panic!("expected transport error, got {other:?}"),
        }
    }
}
