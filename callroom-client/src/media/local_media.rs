use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tracing::debug;
use webrtc::track::track_local::TrackLocal;

/// Local tracks owned by exactly one call session.
pub struct LocalMedia {
    tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>,
    muted: Arc<AtomicBool>,
    stopped: AtomicBool,
    pump: Mutex<Option<JoinHandle<()>>>,
}

impl LocalMedia {
    /// `pump` is the task feeding samples into the tracks; it is aborted on `stop`.
    pub fn new(
        tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>,
        muted: Arc<AtomicBool>,
        pump: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            tracks,
            muted,
            stopped: AtomicBool::new(false),
            pump: Mutex::new(pump),
        }
    }

    pub fn tracks(&self) -> &[Arc<dyn TrackLocal + Send + Sync>] {
        &self.tracks
    }

    pub fn set_muted(&self, muted: bool) {
        debug!("Local media muted: {}", muted);
        self.muted.store(muted, Ordering::SeqCst);
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::SeqCst)
    }

    /// Stops feeding the tracks. Returns `false` if already stopped.
    pub fn stop(&self) -> bool {
        if self.stopped.swap(true, Ordering::SeqCst) {
            return false;
        }
        if let Ok(mut pump) = self.pump.lock() {
            if let Some(handle) = pump.take() {
                handle.abort();
            }
        }
        debug!("Local media stopped ({} tracks)", self.tracks.len());
        true
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

impl Drop for LocalMedia {
    fn drop(&mut self) {
        self.stop();
    }
}
