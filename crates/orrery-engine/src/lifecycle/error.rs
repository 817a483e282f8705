use super::LifecycleState;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failures surfaced by a `RendererLifecycle`.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// No usable adapter, device or surface.
    ///
    /// Fatal for the lifecycle: the host should show a fallback and must not
    /// start rendering.
    #[error("graphics not supported: {0}")]
    Unsupported(String),

    /// A resource required by the scene failed to load.
    #[error("failed to load {what}")]
    AssetLoad {
        what: String,
        #[source]
        source: BoxError,
    },

    /// An operation was called in a state that does not allow it.
    #[error("`{op}` is not valid while {state:?}")]
    InvalidState {
        op: &'static str,
        state: LifecycleState,
    },

    /// The render hook failed; scheduling has been stopped.
    #[error("frame {frame_index} failed")]
    Frame {
        frame_index: u64,
        #[source]
        source: BoxError,
    },
}

impl LifecycleError {
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::Unsupported(reason.into())
    }

    pub fn asset_load(what: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::AssetLoad {
            what: what.into(),
            source: source.into(),
        }
    }

    /// `true` for failures that mean the platform cannot render at all.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}
