use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Boundary to an audio input device. Capture itself is a black box; the
/// device hands back interleaved f32 frames at its native sample rate and
/// channel count.
#[async_trait]
pub trait AudioInput: Send + Sync {
    fn label(&self) -> String;
    fn sample_rate(&self) -> u32;
    fn channels(&self) -> u16;

    /// Capture roughly `duration_secs` of interleaved f32 samples.
    async fn read_frames(&self, duration_secs: f64) -> Result<Vec<f32>>;
}

/// Downmix interleaved multi-channel samples to mono by averaging channels.
pub fn downmix_to_mono(frames: &[f32], channels: u16) -> Vec<f32> {
    let channels = channels.max(1) as usize;
    if channels == 1 {
        return frames.to_vec();
    }
    frames
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Convert mono f32 samples to PCM16, clipping to [-1, 1] first.
pub fn to_pcm16(mono: &[f32]) -> Vec<i16> {
    mono.iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}

/// Input level 0-100 from a short capture, for the live meter.
pub fn level_from_frames(frames: &[f32]) -> u8 {
    if frames.is_empty() {
        return 0;
    }
    let norm = frames.iter().map(|s| s * s).sum::<f32>().sqrt() / frames.len() as f32;
    ((norm * 1000.0) as u32).min(100) as u8
}

/// Record from the device for `duration_secs` and write a mono PCM16 WAV
/// into `out_dir`. Returns the path of the written file. A capture or write
/// failure aborts this operation only.
pub async fn record_to_wav(
    device: &dyn AudioInput,
    duration_secs: f64,
    out_dir: &Path,
) -> Result<PathBuf> {
    info!(
        "Recording {}s from {} ({} Hz, {} channels)",
        duration_secs,
        device.label(),
        device.sample_rate(),
        device.channels()
    );

    let frames = device
        .read_frames(duration_secs)
        .await
        .context("Audio capture failed")?;
    let mono = downmix_to_mono(&frames, device.channels());
    let pcm = to_pcm16(&mono);

    let filename = format!(
        "recording-{}.wav",
        chrono::Local::now().format("%Y%m%d-%H%M%S")
    );
    let path = out_dir.join(filename);

    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: device.sample_rate(),
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec)
        .with_context(|| format!("Failed to create WAV file: {:?}", path))?;
    for sample in pcm {
        writer.write_sample(sample).context("Failed to write WAV sample")?;
    }
    writer.finalize().context("Failed to finalize WAV file")?;

    info!("Recording saved to {:?}", path);
    Ok(path)
}

/// Cancellable periodic poll of the input level, for a live UI meter.
///
/// The monitor shares nothing with the pipeline beyond the device handle.
/// It must be stopped before a recording or transcription starts to avoid
/// device contention; dropping the handle also cancels the task.
pub struct LevelMonitor {
    stop: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl LevelMonitor {
    /// Start polling. `on_level` receives a value 0-100 every `interval`;
    /// capture errors report as level 0.
    pub fn start<F>(device: Arc<dyn AudioInput>, interval: Duration, mut on_level: F) -> Self
    where
        F: FnMut(u8) + Send + 'static,
    {
        let (stop, mut stopped) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = stopped.changed() => {
                        debug!("Level monitor stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let frames = device.read_frames(0.1).await.unwrap_or_default();
                        let mono = downmix_to_mono(&frames, device.channels());
                        on_level(level_from_frames(&mono));
                    }
                }
            }
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    /// Stop polling and wait for the task to finish.
    pub async fn stop(mut self) {
        let _ = self.stop.send(true);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for LevelMonitor {
    fn drop(&mut self) {
        if let Some(handle) = &self.handle {
            handle.abort();
        }
    }
}
