use crate::error::SetupError;
use crate::media::{LocalMedia, MediaSource};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::debug;
use webrtc::api::media_engine::MIME_TYPE_OPUS;
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// One Opus frame of silence.
const OPUS_SILENCE: [u8; 3] = [0xf8, 0xff, 0xfe];

/// Headless audio source producing Opus silence, for machines without capture devices.
#[derive(Debug, Clone)]
pub struct SyntheticMedia {
    frame: Duration,
}

impl SyntheticMedia {
    pub fn new() -> Self {
        Self {
            frame: Duration::from_millis(20),
        }
    }
}

impl Default for SyntheticMedia {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaSource for SyntheticMedia {
    async fn acquire(&self) -> Result<LocalMedia, SetupError> {
        let track = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                ..Default::default()
            },
            "audio".to_owned(),
            "callroom-synthetic".to_owned(),
        ));

        let muted = Arc::new(AtomicBool::new(false));
        let frame = self.frame;
        let pump = tokio::spawn({
            let track = Arc::clone(&track);
            let muted = Arc::clone(&muted);
            async move {
                let mut ticker = tokio::time::interval(frame);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    ticker.tick().await;
                    if muted.load(Ordering::Relaxed) {
                        continue;
                    }
                    let sample = Sample {
                        data: Bytes::from_static(&OPUS_SILENCE),
                        duration: frame,
                        ..Default::default()
                    };
                    if let Err(e) = track.write_sample(&sample).await {
                        debug!("Synthetic sample write failed: {}", e);
                    }
                }
            }
        });

        let tracks: Vec<Arc<dyn TrackLocal + Send + Sync>> = vec![track];
        Ok(LocalMedia::new(tracks, muted, Some(pump)))
    }
}
