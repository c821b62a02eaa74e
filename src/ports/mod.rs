// Ports - Interface definitions (contracts)

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

use crate::compiler::CompiledInstruction;
use crate::domain::errors::EditResult;
use crate::domain::model::{TimeInterval, TrackDescriptor};

/// Probe report for one media file. Any field the probe cannot determine is
/// simply absent, never a failure.
#[derive(Debug, Clone, Default)]
pub struct MediaProbe {
    pub duration: Option<TimeInterval>,
    pub start_offset: Option<TimeInterval>,
    pub resolution: Option<(u32, u32)>,
    pub video_bitrate: Option<u64>,
    pub audio_tracks: Vec<TrackDescriptor>,
    pub subtitle_tracks: Vec<TrackDescriptor>,
}

/// Port for media file probing
#[async_trait]
pub trait ProbePort: Send + Sync {
    async fn probe(&self, path: &Path) -> EditResult<MediaProbe>;
}

/// Port for rendering one timeline thumbnail frame as encoded image bytes
#[async_trait]
pub trait ThumbnailPort: Send + Sync {
    async fn render(&self, path: &Path, timestamp: TimeInterval) -> EditResult<Vec<u8>>;
}

/// Progress callback: elapsed output seconds so far
pub type ProgressFn = Arc<dyn Fn(f64) + Send + Sync>;

/// Completion callback: whether the engine finished successfully
pub type CompleteFn = Arc<dyn Fn(bool) + Send + Sync>;

/// Port for executing a compiled instruction sequence asynchronously
#[async_trait]
pub trait ExecutePort: Send + Sync {
    /// Start execution. Progress callbacks may arrive on arbitrary threads;
    /// completion fires exactly once.
    async fn execute(
        &self,
        instruction: &CompiledInstruction,
        on_progress: ProgressFn,
        on_complete: CompleteFn,
    ) -> EditResult<CancellationHandle>;
}

/// Handle to a running export. `cancel` is idempotent: cancelling twice, or
/// after natural completion, is a no-op.
#[derive(Clone)]
pub struct CancellationHandle {
    cancelled: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancellationHandle {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Request cancellation. Only the first call has any effect.
    pub fn cancel(&self) {
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            self.notify.notify_waiters();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Resolves once cancellation is requested.
    ///
    /// The waiter registers before the flag is re-checked, so a `cancel`
    /// racing this call cannot notify into a void and be lost.
    pub async fn cancelled(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

impl Default for CancellationHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Externally persisted user preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Keep the window above others
    #[serde(default)]
    pub pinned: bool,
    /// Container format chosen on the last export
    #[serde(default)]
    pub last_container: Option<String>,
}

/// Port for the injected preference key-value store
pub trait PrefsStore: Send + Sync {
    fn load(&self) -> EditResult<Preferences>;
    fn save(&self, prefs: &Preferences) -> EditResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_cancellation_is_idempotent() {
        let handle = CancellationHandle::new();
        assert!(!handle.is_cancelled());
        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_for_a_registered_waiter() {
        let handle = CancellationHandle::new();
        let waiter = handle.clone();
        let task = tokio::spawn(async move { waiter.cancelled().await });

        tokio::task::yield_now().await;
        handle.cancel();
        tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("waiter never woke")
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_resolves_when_already_cancelled() {
        let handle = CancellationHandle::new();
        handle.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle.cancelled())
            .await
            .expect("pre-cancelled handle must resolve immediately");
    }
}
