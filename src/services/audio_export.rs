//! Audio-only export backends.
//!
//! The download pipeline hands a fetched media file to an [`AudioExporter`],
//! which locates the first audio track and re-encodes it into a standalone
//! audio container. [`FfmpegExporter`] drives the external `ffmpeg`/`ffprobe`
//! binaries; [`UnavailableExporter`] stands in when they are missing.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::debug;

use crate::types::download::{AudioContainer, AudioTrack, ExportPreset};
use crate::types::errors::DownloadError;

/// Shared export progress in [0, 1], written by the exporter and polled by the pipeline.
#[derive(Debug, Clone, Default)]
pub struct ExportProgress {
    bits: Arc<AtomicU64>,
}

impl ExportProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, fraction: f64) {
        let clamped = fraction.clamp(0.0, 1.0);
        self.bits.store(clamped.to_bits(), Ordering::Relaxed);
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

/// Everything an exporter needs to produce one audio file.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub track: AudioTrack,
    pub preset: ExportPreset,
    pub container: AudioContainer,
}

/// Trait for audio extraction backends.
#[async_trait]
pub trait AudioExporter: Send + Sync {
    /// Returns the first audio track of the media file, or `None` if it has none.
    async fn first_audio_track(&self, source: &Path) -> Result<Option<AudioTrack>, DownloadError>;

    /// Output containers this backend can write with the given preset.
    fn supported_containers(&self, preset: ExportPreset) -> Vec<AudioContainer>;

    /// Copies the track's full time range into the destination container,
    /// reporting progress as it goes.
    async fn export(&self, request: &ExportRequest, progress: &ExportProgress) -> Result<(), DownloadError>;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

// === ffmpeg ===

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    index: u32,
    codec_name: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

fn parse_seconds(value: Option<&str>) -> Option<Duration> {
    let secs: f64 = value?.trim().parse().ok()?;
    (secs.is_finite() && secs > 0.0).then(|| Duration::from_secs_f64(secs))
}

/// Reads the first audio stream out of `ffprobe -of json` output.
fn parse_probe_output(stdout: &[u8]) -> Result<Option<AudioTrack>, DownloadError> {
    let probe: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| DownloadError::ExportFailed(format!("unreadable ffprobe output: {}", e)))?;
    let container_duration = probe
        .format
        .as_ref()
        .and_then(|f| parse_seconds(f.duration.as_deref()));

    Ok(probe.streams.into_iter().next().map(|stream| AudioTrack {
        index: stream.index,
        codec: stream.codec_name,
        duration: parse_seconds(stream.duration.as_deref()).or(container_duration),
    }))
}

/// Lines of ffmpeg's stderr kept for the error message.
const STDERR_TAIL_LINES: usize = 20;

/// Reads `reader` to EOF, keeping only its last `keep` lines.
async fn tail_lines<R: AsyncRead + Unpin>(reader: R, keep: usize) -> String {
    let mut reader = BufReader::new(reader);
    let mut tail: VecDeque<String> = VecDeque::with_capacity(keep);
    let mut line = Vec::new();
    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                if tail.len() == keep {
                    tail.pop_front();
                }
                tail.push_back(String::from_utf8_lossy(&line).trim_end().to_string());
            }
        }
    }
    Vec::from(tail).join("\n").trim().to_string()
}

/// Maps one `-progress` key=value line to a completion fraction.
fn parse_progress_line(line: &str, duration: Option<Duration>) -> Option<f64> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        "progress" if value == "end" => Some(1.0),
        // ffmpeg reports both keys in microseconds.
        "out_time_us" | "out_time_ms" => {
            let total = duration?.as_micros() as f64;
            let done: f64 = value.parse().ok()?;
            (total > 0.0).then(|| (done / total).clamp(0.0, 1.0))
        }
        _ => None,
    }
}

/// Exporter that shells out to `ffmpeg` and `ffprobe`.
pub struct FfmpegExporter {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl FfmpegExporter {
    pub fn new(ffmpeg: PathBuf, ffprobe: PathBuf) -> Self {
        Self { ffmpeg, ffprobe }
    }

    /// Looks both binaries up in `PATH`.
    pub fn from_path() -> Option<Self> {
        let ffmpeg = which::which("ffmpeg").ok()?;
        let ffprobe = which::which("ffprobe").ok()?;
        Some(Self::new(ffmpeg, ffprobe))
    }
}

#[async_trait]
impl AudioExporter for FfmpegExporter {
    async fn first_audio_track(&self, source: &Path) -> Result<Option<AudioTrack>, DownloadError> {
        let output = Command::new(&self.ffprobe)
            .args(["-v", "error", "-select_streams", "a"])
            .args(["-show_entries", "stream=index,codec_name,duration:format=duration"])
            .args(["-of", "json"])
            .arg(source)
            .output()
            .await
            .map_err(|e| DownloadError::ExportFailed(format!("failed to execute ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(DownloadError::ExportFailed(format!(
                "ffprobe could not read the media file: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        parse_probe_output(&output.stdout)
    }

    fn supported_containers(&self, preset: ExportPreset) -> Vec<AudioContainer> {
        match preset {
            ExportPreset::AppleM4a => vec![AudioContainer::M4a],
            _ => vec![AudioContainer::Mp4, AudioContainer::Mov, AudioContainer::M4a],
        }
    }

    async fn export(&self, request: &ExportRequest, progress: &ExportProgress) -> Result<(), DownloadError> {
        let mut child = Command::new(&self.ffmpeg)
            .args(["-nostdin", "-y", "-v", "error", "-nostats"])
            .arg("-i")
            .arg(&request.source)
            .arg("-map")
            .arg(format!("0:{}", request.track.index))
            .args(["-vn", "-c:a", "aac", "-b:a", request.preset.audio_bitrate()])
            .args(["-f", request.container.muxer()])
            .args(["-progress", "pipe:1"])
            .arg(&request.destination)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| DownloadError::ExportFailed(format!("failed to execute ffmpeg: {}", e)))?;

        // stderr is drained concurrently; a chatty ffmpeg would otherwise block on
        // a full pipe and never close stdout.
        let stderr_tail = child
            .stderr
            .take()
            .map(|stderr| tokio::spawn(tail_lines(stderr, STDERR_TAIL_LINES)));

        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if let Some(fraction) = parse_progress_line(&line, request.track.duration) {
                    progress.set(fraction);
                }
            }
        }

        let status = child
            .wait()
            .await
            .map_err(|e| DownloadError::ExportFailed(format!("ffmpeg did not finish: {}", e)))?;
        let stderr = match stderr_tail {
            Some(handle) => handle.await.unwrap_or_default(),
            None => String::new(),
        };

        if !status.success() {
            debug!(?status, stderr = %stderr, "ffmpeg export failed");
            return Err(DownloadError::ExportFailed(format!("ffmpeg exited with {}: {}", status, stderr)));
        }
        progress.set(1.0);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}

// === unavailable ===

/// Exporter used when no encoding backend is installed.
///
/// It supports no output container, so every audio-only job fails with
/// `ExportFailed` during preset selection.
pub struct UnavailableExporter;

#[async_trait]
impl AudioExporter for UnavailableExporter {
    async fn first_audio_track(&self, _source: &Path) -> Result<Option<AudioTrack>, DownloadError> {
        Err(DownloadError::ExportFailed(
            "audio export requires ffmpeg and ffprobe in PATH or configured in settings".into(),
        ))
    }

    fn supported_containers(&self, _preset: ExportPreset) -> Vec<AudioContainer> {
        Vec::new()
    }

    async fn export(&self, _request: &ExportRequest, _progress: &ExportProgress) -> Result<(), DownloadError> {
        Err(DownloadError::ExportFailed("no audio export backend available".into()))
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}
