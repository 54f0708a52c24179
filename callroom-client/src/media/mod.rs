mod local_media;
mod synthetic;

pub use local_media::LocalMedia;
pub use synthetic::SyntheticMedia;

use crate::error::SetupError;
use async_trait::async_trait;

/// Acquisition of local camera/microphone tracks.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn acquire(&self) -> Result<LocalMedia, SetupError>;
}
