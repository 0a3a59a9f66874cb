//! Target client adapter
//!
//! Issues exactly one request per call and turns whatever happens into a [`RequestOutcome`].
//! Transport failures never escape as errors; they are recorded with the
//! [`TRANSPORT_FAILURE`](albumload_core::TRANSPORT_FAILURE) status.
use albumload_core::{
    AlbumId, AlbumProfile, ConfigError, Reaction, RequestKind, RequestOutcome, RunConfig,
};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Instant;
#[allow(unused)]
use tracing::{debug, error, info, trace, warn};

/// Result of a create attempt. `album_id` is only present when the attempt succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAlbum {
    pub outcome: RequestOutcome,
    pub album_id: Option<AlbumId>,
}

impl CreatedAlbum {
    pub fn created(outcome: RequestOutcome, album_id: AlbumId) -> Self {
        Self {
            outcome,
            album_id: Some(album_id),
        }
    }

    pub fn failed(outcome: RequestOutcome) -> Self {
        Self {
            outcome: outcome.into_failed(),
            album_id: None,
        }
    }
}

/// Body returned by the album endpoint on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumMeta {
    #[serde(rename = "albumID")]
    pub album_id: String,
    #[serde(rename = "imageSize")]
    pub image_size: u64,
}

/// The requests a simulated user makes against the target.
///
/// Implementations perform a single attempt per call; retries are layered on top by
/// [`RetryPolicy`](crate::retry::RetryPolicy).
#[trait_variant::make(AlbumApi: Send)]
pub trait LocalAlbumApi {
    async fn create_album(&self) -> CreatedAlbum;
    async fn react(&self, album_id: &AlbumId, reaction: Reaction) -> RequestOutcome;
}

/// [`AlbumApi`] over HTTP. Built once per run and shared read-only by every worker.
#[derive(Debug, Clone)]
pub struct HttpAlbumClient {
    client: Client,
    config: RunConfig,
    albums_url: String,
}

impl HttpAlbumClient {
    pub fn new(config: &RunConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        album_form(&config.album).map_err(|err| ConfigError::Client(err.to_string()))?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| ConfigError::Client(err.to_string()))?;

        Ok(Self {
            client,
            albums_url: config.endpoint("albums"),
            config: config.clone(),
        })
    }

    /// Builds the client and checks that the target answers at all.
    pub async fn connect(config: &RunConfig) -> Result<Self, ConfigError> {
        let client = Self::new(config)?;
        client.probe().await?;
        Ok(client)
    }

    /// Any HTTP response, whatever its status, counts as reachable.
    pub async fn probe(&self) -> Result<(), ConfigError> {
        match self.client.get(self.config.target.clone()).send().await {
            Ok(res) => {
                debug!("Probe of {} answered with {}", self.config.target, res.status());
                Ok(())
            }
            Err(err) => Err(ConfigError::Unreachable {
                target: self.config.target.to_string(),
                reason: err.to_string(),
            }),
        }
    }

    fn review_url(&self, album_id: &AlbumId, reaction: Reaction) -> String {
        self.config
            .endpoint(&format!("review/{}/{}", reaction.path_segment(), album_id))
    }
}

impl AlbumApi for HttpAlbumClient {
    async fn create_album(&self) -> CreatedAlbum {
        let kind = RequestKind::CreateAlbum;
        let start_ms = epoch_ms();
        let start = Instant::now();

        let res = async {
            let form = album_form(&self.config.album)?;
            let response = self
                .client
                .post(&self.albums_url)
                .multipart(form)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body))
        }
        .await;
        let latency = start.elapsed();

        let (status, body) = match res {
            Ok(res) => res,
            Err(err) => {
                debug!("Create album transport failure: {err}");
                return CreatedAlbum::failed(RequestOutcome::transport_failure(
                    kind, start_ms, latency,
                ));
            }
        };

        let outcome = RequestOutcome::http(kind, start_ms, latency, status);
        if !outcome.is_success() {
            trace!("Create album failed with status {status}");
            return CreatedAlbum::failed(outcome);
        }

        match serde_json::from_slice::<AlbumMeta>(&body) {
            Ok(meta) if !meta.album_id.is_empty() => {
                trace!("Created album {} ({} bytes)", meta.album_id, meta.image_size);
                CreatedAlbum::created(outcome, AlbumId::new(meta.album_id))
            }
            Ok(_) => {
                debug!("Create album response carried an empty album id");
                CreatedAlbum::failed(outcome)
            }
            Err(err) => {
                debug!("Unparseable create album response: {err}");
                CreatedAlbum::failed(outcome)
            }
        }
    }

    async fn react(&self, album_id: &AlbumId, reaction: Reaction) -> RequestOutcome {
        let kind = reaction.kind();
        let url = self.review_url(album_id, reaction);
        let start_ms = epoch_ms();
        let start = Instant::now();

        let res = async {
            let response = self.client.post(&url).send().await?;
            let status = response.status().as_u16();
            // Drain so the connection goes back to the pool.
            response.bytes().await?;
            Ok::<_, reqwest::Error>(status)
        }
        .await;
        let latency = start.elapsed();

        match res {
            Ok(status) => {
                trace!("{kind} on {album_id} returned {status}");
                RequestOutcome::http(kind, start_ms, latency, status)
            }
            Err(err) => {
                debug!("{kind} transport failure: {err}");
                RequestOutcome::transport_failure(kind, start_ms, latency)
            }
        }
    }
}

fn album_form(album: &AlbumProfile) -> Result<Form, reqwest::Error> {
    let image = Part::bytes(album.image.clone())
        .file_name(album.image_name.clone())
        .mime_str(&album.image_mime)?;

    Ok(Form::new()
        .text("artist", album.artist.clone())
        .text("title", album.title.clone())
        .text("year", album.year.clone())
        .part("image", image))
}

fn epoch_ms() -> u64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as u64
}
