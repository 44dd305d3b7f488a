//! Exercise backend client.
//!
//! The backend owns filtering and the per-user blocked set; this side only
//! lists exercises and submits blocks.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::json;
use url::Url;

use super::types::{ExerciseBatch, ExerciseId, FilterContext, UserId};
use crate::error::ClientError;

/// Operations the rotator needs from an exercise backend.
#[async_trait]
pub trait ExerciseApi: Send + Sync {
    /// List exercises for the given filters. A backend that finds nothing
    /// still returns its default list with `exercises_found = false`.
    async fn fetch_exercises(&self, filter: &FilterContext) -> Result<ExerciseBatch, ClientError>;

    /// Add `exercise_id` to the user's blocked set.
    async fn block_exercise(
        &self,
        user_id: UserId,
        exercise_id: ExerciseId,
    ) -> Result<(), ClientError>;
}

/// [`ExerciseApi`] over HTTP.
pub struct HttpExerciseClient {
    base_url: Url,
    http_client: Client,
}

impl HttpExerciseClient {
    /// Create a client rooted at `base_url`. Every request is bounded by
    /// `timeout`.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ClientError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            http_client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        // Keep any path prefix on the base URL.
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path)
            .map_err(|e| ClientError::Network(format!("invalid endpoint '{path}': {e}")))
    }
}

#[async_trait]
impl ExerciseApi for HttpExerciseClient {
    async fn fetch_exercises(&self, filter: &FilterContext) -> Result<ExerciseBatch, ClientError> {
        let url = self.endpoint("exercises")?;

        let resp = self
            .http_client
            .get(url)
            .query(&filter.query_pairs())
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ClientError::Network(format!(
                "exercise listing returned {status}"
            )));
        }

        let batch: ExerciseBatch = resp.json().await?;
        tracing::debug!(
            count = batch.exercises.len(),
            exercises_found = batch.exercises_found,
            "fetched exercises"
        );
        Ok(batch)
    }

    async fn block_exercise(
        &self,
        user_id: UserId,
        exercise_id: ExerciseId,
    ) -> Result<(), ClientError> {
        let url = self.endpoint(&format!("users/{user_id}/block"))?;

        let resp = self
            .http_client
            .post(url)
            .json(&json!({ "exercise_id": exercise_id }))
            .send()
            .await?;

        match resp.status() {
            StatusCode::CREATED => Ok(()),
            other => Err(ClientError::Authorization {
                status: other.as_u16(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> HttpExerciseClient {
        let base = Url::parse(&server.url()).unwrap();
        HttpExerciseClient::new(base, Duration::from_secs(5)).unwrap()
    }

    const BATCH: &str = r#"{
        "exercises": [
            {"id": 1, "name": "sit-up", "gifUrl": "sit-up.url", "instructions": ["Do a sit-up"]},
            {"id": 2, "name": "chin-up", "gifUrl": "chin-up.url", "instructions": ["Do a chin-up"]}
        ],
        "exercises_found": true
    }"#;

    #[tokio::test]
    async fn fetch_sends_filters_and_parses_batch() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/exercises")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("equipment".into(), "body weight".into()),
                Matcher::UrlEncoded("target".into(), "abs".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(BATCH)
            .create_async()
            .await;

        let filter = FilterContext {
            equipment: vec!["body weight".into()],
            targets: vec!["abs".into()],
        };
        let batch = client_for(&server).fetch_exercises(&filter).await.unwrap();

        mock.assert_async().await;
        assert!(batch.exercises_found);
        assert_eq!(batch.exercises.len(), 2);
        assert_eq!(batch.exercises[1].name, "chin-up");
    }

    #[tokio::test]
    async fn fetch_non_success_is_network_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/exercises")
            .with_status(500)
            .create_async()
            .await;

        let err = client_for(&server)
            .fetch_exercises(&FilterContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[tokio::test]
    async fn fetch_garbage_body_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/exercises")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let err = client_for(&server)
            .fetch_exercises(&FilterContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn block_posts_exercise_id_and_accepts_201() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/users/3/block")
            .match_body(Matcher::Json(json!({ "exercise_id": 42 })))
            .with_status(201)
            .create_async()
            .await;

        client_for(&server)
            .block_exercise(UserId(3), ExerciseId(42))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn block_with_other_status_is_authorization_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/users/3/block")
            .with_status(200)
            .create_async()
            .await;

        let err = client_for(&server)
            .block_exercise(UserId(3), ExerciseId(42))
            .await
            .unwrap_err();
        assert_eq!(err, ClientError::Authorization { status: 200 });
    }

    #[tokio::test]
    async fn unreachable_backend_is_network_error() {
        let base = Url::parse("http://127.0.0.1:9").unwrap();
        let client = HttpExerciseClient::new(base, Duration::from_millis(500)).unwrap();
        let err = client
            .block_exercise(UserId(1), ExerciseId(1))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let base = Url::parse("https://example.com/api").unwrap();
        let client = HttpExerciseClient::new(base, Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint("users/5/block").unwrap().as_str(),
            "https://example.com/api/users/5/block"
        );
    }
}
