/// Lifecycle state machine.
///
/// ```text
/// Uninitialized → Initializing → Ready ⇄ Running → Stopped
///                      ↑                    │         │
///                      └──── Restarting ←───┴─────────┘
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Ready,
    Running,
    Stopped,
    Restarting,
}

impl LifecycleState {
    /// Device, assets and pipeline are populated.
    #[inline]
    pub fn is_initialized(self) -> bool {
        matches!(self, Self::Ready | Self::Running | Self::Stopped)
    }
}
