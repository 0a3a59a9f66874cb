//! In-process stand-in for the album review service.
//!
//! Serves `POST /albums` (multipart `artist`, `title`, `year`, `image`) and
//! `POST /review/{like|dislike}/{albumID}`, with configurable status codes, album ids and
//! latency so the harness can be exercised end to end.
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::debug;

pub mod prelude {
    pub use crate::{spawn, MockConfig, MockService};
    pub use axum::http::StatusCode;
}

/// How the mock answers.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub create_status: StatusCode,
    pub review_status: StatusCode,
    /// Fixed id handed out for every album; a fresh UUID per album when `None`.
    pub album_id: Option<String>,
    /// Reported image size; the uploaded image's length when `None`.
    pub image_size: Option<u64>,
    /// Raw body returned by successful creates instead of the JSON metadata.
    pub create_body: Option<String>,
    pub latency: Duration,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            create_status: StatusCode::OK,
            review_status: StatusCode::CREATED,
            album_id: None,
            image_size: None,
            create_body: None,
            latency: Duration::ZERO,
        }
    }
}

impl MockConfig {
    /// Every request fails with `status`.
    pub fn failing(status: StatusCode) -> Self {
        Self {
            create_status: status,
            review_status: status,
            ..Self::default()
        }
    }

    pub fn album_id(mut self, id: &str) -> Self {
        self.album_id = Some(id.to_string());
        self
    }

    pub fn image_size(mut self, size: u64) -> Self {
        self.image_size = Some(size);
        self
    }

    pub fn create_body(mut self, body: &str) -> Self {
        self.create_body = Some(body.to_string());
        self
    }

    pub fn review_status(mut self, status: StatusCode) -> Self {
        self.review_status = status;
        self
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[derive(Serialize)]
struct AlbumMeta {
    #[serde(rename = "albumID")]
    album_id: String,
    #[serde(rename = "imageSize")]
    image_size: u64,
}

#[derive(Default)]
struct Counters {
    creates: AtomicU64,
    likes: AtomicU64,
    dislikes: AtomicU64,
}

struct MockState {
    config: MockConfig,
    counters: Counters,
}

/// A running mock bound to an ephemeral local port. Stops when dropped.
pub struct MockService {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: JoinHandle<()>,
}

impl MockService {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Create requests received, valid or not.
    pub fn creates(&self) -> u64 {
        self.state.counters.creates.load(Ordering::Relaxed)
    }

    pub fn likes(&self) -> u64 {
        self.state.counters.likes.load(Ordering::Relaxed)
    }

    pub fn dislikes(&self) -> u64 {
        self.state.counters.dislikes.load(Ordering::Relaxed)
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Starts the mock on `127.0.0.1` with an OS-assigned port.
pub async fn spawn(config: MockConfig) -> anyhow::Result<MockService> {
    let state = Arc::new(MockState {
        config,
        counters: Counters::default(),
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = router(state.clone());

    let handle = tokio::spawn(async move {
        if let Err(err) = axum::serve(listener, app).await {
            tracing::error!("Mock service stopped: {err}");
        }
    });

    Ok(MockService {
        addr,
        state,
        handle,
    })
}

/// Serves the mock on `addr` until the process exits.
pub async fn run(addr: SocketAddr, config: MockConfig) -> anyhow::Result<()> {
    let state = Arc::new(MockState {
        config,
        counters: Counters::default(),
    });
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/albums", post(create_album))
        .route("/review/:reaction/:album_id", post(review))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn create_album(State(state): State<Arc<MockState>>, mut multipart: Multipart) -> Response {
    state.counters.creates.fetch_add(1, Ordering::Relaxed);

    let mut artist = false;
    let mut title = false;
    let mut year = false;
    let mut image_len = 0;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
        };
        let name = field.name().map(str::to_owned);
        let data = match field.bytes().await {
            Ok(data) => data,
            Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
        };
        match name.as_deref() {
            Some("artist") => artist = true,
            Some("title") => title = true,
            Some("year") => year = true,
            Some("image") => image_len = data.len(),
            _ => {}
        }
    }

    if !state.config.latency.is_zero() {
        tokio::time::sleep(state.config.latency).await;
    }

    if !(artist && title && year && image_len > 0) {
        return (
            StatusCode::BAD_REQUEST,
            "Invalid or missing parameter! Must add artist, title, year, image",
        )
            .into_response();
    }

    let status = state.config.create_status;
    if !status.is_success() {
        return (status, "Error while saving image and album info").into_response();
    }

    if let Some(body) = &state.config.create_body {
        return (status, body.clone()).into_response();
    }

    let meta = AlbumMeta {
        album_id: state
            .config
            .album_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string()),
        image_size: state.config.image_size.unwrap_or(image_len as u64),
    };
    debug!("Created album {}", meta.album_id);
    (status, Json(meta)).into_response()
}

async fn review(
    State(state): State<Arc<MockState>>,
    Path((reaction, album_id)): Path<(String, String)>,
) -> Response {
    let counter = match reaction.as_str() {
        "like" => &state.counters.likes,
        "dislike" => &state.counters.dislikes,
        _ => return (StatusCode::BAD_REQUEST, "Invalid request").into_response(),
    };
    counter.fetch_add(1, Ordering::Relaxed);

    if !state.config.latency.is_zero() {
        tokio::time::sleep(state.config.latency).await;
    }

    debug!("{reaction} on {album_id}");
    state.config.review_status.into_response()
}
