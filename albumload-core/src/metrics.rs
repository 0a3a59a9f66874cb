use crate::RequestKind;

/// Metric names recorded for each outcome of a given [`RequestKind`].
#[derive(Copy, Clone, Debug)]
pub struct OutcomeLabels {
    pub success: &'static str,
    pub error: &'static str,
    pub latency: &'static str,
}

#[macro_export]
macro_rules! generate_labels {
    ($base_name:ident) => {
        $crate::OutcomeLabels {
            success: concat!("albumload_", stringify!($base_name), "_success"),
            error: concat!("albumload_", stringify!($base_name), "_error"),
            latency: concat!("albumload_", stringify!($base_name), "_latency"),
        }
    };
}

impl RequestKind {
    pub fn labels(self) -> OutcomeLabels {
        match self {
            RequestKind::CreateAlbum => generate_labels!(create_album),
            RequestKind::LikeAlbum => generate_labels!(like_album),
            RequestKind::DislikeAlbum => generate_labels!(dislike_album),
        }
    }
}
