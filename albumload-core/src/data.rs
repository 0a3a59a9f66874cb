use crate::{FAILURE_STATUS, TRANSPORT_FAILURE};
use std::fmt;
use std::time::Duration;

/// The three requests the album workflow issues.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RequestKind {
    CreateAlbum,
    LikeAlbum,
    DislikeAlbum,
}

impl RequestKind {
    pub const ALL: [RequestKind; 3] = [
        RequestKind::CreateAlbum,
        RequestKind::LikeAlbum,
        RequestKind::DislikeAlbum,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::CreateAlbum => "CreateAlbum",
            RequestKind::LikeAlbum => "LikeAlbum",
            RequestKind::DislikeAlbum => "DislikeAlbum",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Review posted against an existing album.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Reaction {
    Like,
    Dislike,
}

impl Reaction {
    /// Path segment used by the review endpoint.
    pub fn path_segment(self) -> &'static str {
        match self {
            Reaction::Like => "like",
            Reaction::Dislike => "dislike",
        }
    }

    pub fn kind(self) -> RequestKind {
        match self {
            Reaction::Like => RequestKind::LikeAlbum,
            Reaction::Dislike => RequestKind::DislikeAlbum,
        }
    }
}

/// Opaque identifier handed out by the target when an album is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlbumId(String);

impl AlbumId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlbumId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a single network attempt. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    kind: RequestKind,
    start_ms: u64,
    latency: Duration,
    status: u16,
    success: bool,
}

impl RequestOutcome {
    /// Outcome of an attempt which received an HTTP response.
    pub fn http(kind: RequestKind, start_ms: u64, latency: Duration, status: u16) -> Self {
        Self {
            kind,
            start_ms,
            latency,
            status,
            success: status != TRANSPORT_FAILURE && status < FAILURE_STATUS,
        }
    }

    /// Outcome of an attempt which never produced a usable response.
    pub fn transport_failure(kind: RequestKind, start_ms: u64, latency: Duration) -> Self {
        Self {
            kind,
            start_ms,
            latency,
            status: TRANSPORT_FAILURE,
            success: false,
        }
    }

    /// Marks an otherwise successful response as failed, keeping its status code.
    /// Used when a create response cannot be parsed.
    pub fn into_failed(mut self) -> Self {
        self.success = false;
        self
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Wall-clock start of the attempt, in milliseconds since the Unix epoch.
    pub fn start_ms(&self) -> u64 {
        self.start_ms
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn latency_ms(&self) -> u128 {
        self.latency.as_millis()
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_transport_failure(&self) -> bool {
        self.status == TRANSPORT_FAILURE
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}
