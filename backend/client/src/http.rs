use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use zeorag_config::ClientConfig;
use zeorag_core::{
    AnswerStream, Document, DocumentListing, DocumentUpload, QueryRequest, RagBackend, Session,
    Turn, ZeoError,
};

/// `RagBackend` over the backend's REST and streaming HTTP API.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a client from resolved config. Timeouts apply per request.
    pub fn new(config: &ClientConfig) -> Result<Self, ZeoError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| ZeoError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, config.base_url()))
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/sessions/{id}` with the id percent-encoded as a single segment.
    fn session_url(&self, session_id: &str) -> Result<Url, ZeoError> {
        let mut url = Url::parse(&self.url("/sessions")).map_err(|e| {
            ZeoError::Config(format!("invalid backend URL '{}': {e}", self.base_url))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ZeoError::Config(format!("backend URL '{}' cannot take a path", self.base_url))
            })?
            .push(session_id);
        Ok(url)
    }
}

fn transport(e: reqwest::Error) -> ZeoError {
    ZeoError::Transport(e.to_string())
}

/// Turn non-2xx statuses into `ZeoError::Backend`, keeping the body text.
async fn ensure_success(response: Response) -> Result<Response, ZeoError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ZeoError::Backend {
        status: status.as_u16(),
        body,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ZeoError> {
    let bytes = response.bytes().await.map_err(transport)?;
    serde_json::from_slice(&bytes).map_err(|e| ZeoError::Decode(e.to_string()))
}

#[async_trait]
impl RagBackend for HttpBackend {
    async fn list_sessions(&self) -> Result<Vec<Session>, ZeoError> {
        debug!("GET /sessions");
        let response = self
            .client
            .get(self.url("/sessions"))
            .send()
            .await
            .map_err(transport)?;
        read_json(ensure_success(response).await?).await
    }

    async fn chat_history(&self, session_id: &str) -> Result<Vec<Turn>, ZeoError> {
        debug!(session_id, "GET /sessions/{{id}}");
        let response = self
            .client
            .get(self.session_url(session_id)?)
            .send()
            .await
            .map_err(transport)?;
        read_json(ensure_success(response).await?).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), ZeoError> {
        debug!(session_id, "DELETE /sessions/{{id}}");
        let response = self
            .client
            .delete(self.session_url(session_id)?)
            .send()
            .await
            .map_err(transport)?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn query(&self, request: &QueryRequest) -> Result<AnswerStream, ZeoError> {
        debug!(session_name = %request.session_name, "POST /query");
        let response = self
            .client
            .post(self.url("/query"))
            .json(request)
            .send()
            .await
            .map_err(transport)?;
        let response = ensure_success(response).await?;
        Ok(response.bytes_stream().map_err(transport).boxed())
    }

    async fn list_documents(&self) -> Result<Vec<Document>, ZeoError> {
        debug!("GET /list_documents");
        let response = self
            .client
            .get(self.url("/list_documents"))
            .send()
            .await
            .map_err(transport)?;
        let listing: DocumentListing = read_json(ensure_success(response).await?).await?;
        Ok(listing.documents)
    }

    async fn upload_document(&self, upload: DocumentUpload) -> Result<(), ZeoError> {
        debug!(filename = %upload.filename, bytes = upload.bytes.len(), "POST /upload_document/");
        let part = Part::bytes(upload.bytes.to_vec())
            .file_name(upload.filename)
            .mime_str("application/pdf")
            .map_err(transport)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/upload_document/"))
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::body::Body;
    use axum::extract::{Multipart, Path, State};
    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use bytes::Bytes;
    use futures::stream;
    use serde_json::{json, Value};
    use zeorag_core::{reduce_stream, QueryOutcome, Transcript};

    #[derive(Clone, Default)]
    struct Seen {
        deleted: Arc<Mutex<Vec<String>>>,
        queries: Arc<Mutex<Vec<Value>>>,
        uploads: Arc<Mutex<Vec<(String, String, usize)>>>,
    }

    async fn spawn(router: Router) -> HttpBackend {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        HttpBackend::with_client(Client::new(), format!("http://{addr}/"))
    }

    /// Yields each chunk after a short pause so they leave as separate writes.
    fn paced(parts: Vec<Result<Bytes, std::io::Error>>) -> Body {
        let items = stream::unfold(parts.into_iter(), |mut it| async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            it.next().map(|item| (item, it))
        });
        Body::from_stream(items)
    }

    fn backend_router(seen: Seen) -> Router {
        Router::new()
            .route(
                "/sessions",
                get(|| async {
                    Json(json!([
                        {"session_id": "0b7e", "session_name": "thesis"},
                        {"session_id": "s2", "session_name": null}
                    ]))
                }),
            )
            .route(
                "/sessions/:id",
                get(|Path(id): Path<String>| async move {
                    if id == "missing" {
                        return Err((StatusCode::NOT_FOUND, "no such session"));
                    }
                    Ok(Json(json!([
                        {"role": "user", "content": format!("hello from {id}")},
                        {"role": "assistant", "content": "hi"}
                    ])))
                })
                .delete(
                    |State(seen): State<Seen>, Path(id): Path<String>| async move {
                        seen.deleted.lock().unwrap().push(id);
                        StatusCode::OK
                    },
                ),
            )
            .route(
                "/query",
                post(
                    |State(seen): State<Seen>, Json(body): Json<Value>| async move {
                        seen.queries.lock().unwrap().push(body);
                        // "é" split across the first two chunks
                        paced(vec![
                            Ok(Bytes::from_static(b"caf\xC3")),
                            Ok(Bytes::from_static(b"\xA9 au ")),
                            Ok(Bytes::from_static(b"lait")),
                        ])
                    },
                ),
            )
            .route(
                "/list_documents",
                get(|| async { Json(json!({"documents": ["attention.pdf", "rag.pdf"]})) }),
            )
            .route(
                "/upload_document/",
                post(
                    |State(seen): State<Seen>, mut multipart: Multipart| async move {
                        while let Ok(Some(field)) = multipart.next_field().await {
                            let name = field.name().unwrap_or_default().to_string();
                            let file_name = field.file_name().unwrap_or_default().to_string();
                            let len = field.bytes().await.map(|b| b.len()).unwrap_or(0);
                            seen.uploads.lock().unwrap().push((name, file_name, len));
                        }
                        StatusCode::OK
                    },
                ),
            )
            .with_state(seen)
    }

    #[tokio::test]
    async fn test_list_sessions_normalizes_names() {
        let backend = spawn(backend_router(Seen::default())).await;
        let sessions = backend.list_sessions().await.unwrap();
        assert_eq!(
            sessions,
            vec![Session::new("0b7e", "thesis"), Session::new("s2", "s2")]
        );
    }

    #[tokio::test]
    async fn test_chat_history_encodes_session_id() {
        let backend = spawn(backend_router(Seen::default())).await;
        let turns = backend.chat_history("my notes").await.unwrap();
        assert_eq!(turns[0], Turn::user("hello from my notes"));
        assert_eq!(turns.len(), 2);
    }

    #[tokio::test]
    async fn test_non_success_status_is_backend_error() {
        let backend = spawn(backend_router(Seen::default())).await;
        match backend.chat_history("missing").await {
            Err(ZeoError::Backend { status, body }) => {
                assert_eq!(status, 404);
                assert_eq!(body, "no such session");
            }
            other => panic!("expected backend error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_session() {
        let seen = Seen::default();
        let backend = spawn(backend_router(seen.clone())).await;
        backend.delete_session("s2").await.unwrap();
        assert_eq!(*seen.deleted.lock().unwrap(), vec!["s2".to_string()]);
    }

    #[tokio::test]
    async fn test_query_streams_into_transcript() {
        let seen = Seen::default();
        let backend = spawn(backend_router(seen.clone())).await;

        let request = QueryRequest {
            question: "coffee?".into(),
            session_name: "thesis".into(),
        };
        let answer = backend.query(&request).await.unwrap();
        let mut transcript = Transcript::new();
        let outcome = reduce_stream(&mut transcript, "coffee?", answer, |_| {}).await;

        assert!(outcome.is_completed());
        assert_eq!(
            transcript.turns(),
            &[Turn::user("coffee?"), Turn::assistant("café au lait")]
        );
        assert_eq!(
            seen.queries.lock().unwrap()[0],
            json!({"question": "coffee?", "session_name": "thesis"})
        );
    }

    #[tokio::test]
    async fn test_query_interrupted_mid_stream() {
        let router = Router::new().route(
            "/query",
            post(|| async {
                paced(vec![
                    Ok(Bytes::from_static(b"partial ")),
                    Err(std::io::Error::other("backend crashed")),
                ])
            }),
        );
        let backend = spawn(router).await;
        let request = QueryRequest {
            question: "q".into(),
            session_name: "s".into(),
        };
        let answer = backend.query(&request).await.unwrap();
        let mut transcript = Transcript::new();
        let outcome = reduce_stream(&mut transcript, "q", answer, |_| {}).await;

        assert!(matches!(outcome, QueryOutcome::Interrupted { chunks: 1, .. }));
        assert_eq!(
            transcript.turns(),
            &[Turn::user("q"), Turn::assistant("partial ")]
        );
    }

    #[tokio::test]
    async fn test_list_documents() {
        let backend = spawn(backend_router(Seen::default())).await;
        let docs = backend.list_documents().await.unwrap();
        assert_eq!(
            docs,
            vec![Document("attention.pdf".into()), Document("rag.pdf".into())]
        );
    }

    #[tokio::test]
    async fn test_upload_sends_file_field() {
        let seen = Seen::default();
        let backend = spawn(backend_router(seen.clone())).await;
        backend
            .upload_document(DocumentUpload::new("paper.pdf", vec![0x25u8, 0x50, 0x44, 0x46]))
            .await
            .unwrap();
        assert_eq!(
            *seen.uploads.lock().unwrap(),
            vec![("file".to_string(), "paper.pdf".to_string(), 4)]
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let backend = HttpBackend::with_client(Client::new(), format!("http://{addr}"));
        assert!(matches!(
            backend.list_sessions().await,
            Err(ZeoError::Transport(_))
        ));
    }
}
