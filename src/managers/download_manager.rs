//! Download Manager for Video Pocket.
//!
//! Streams a remote media file into the output directory, reporting progress,
//! and optionally extracts its audio track into an `.m4a` file.
//!
//! A manager runs at most one job at a time: a request made while another job
//! is active fails immediately with [`DownloadError::Busy`]. Progress is
//! published on a `watch` channel (see [`DownloadManager::subscribe`]) and,
//! per call, through an optional callback.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::{watch, Semaphore};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use url::Url;
use uuid::Uuid;

use crate::services::audio_export::{AudioExporter, ExportProgress, ExportRequest};
use crate::services::youtube;
use crate::types::download::{
    AudioContainer, DownloadKind, DownloadSnapshot, DownloadState, ExportPreset,
};
use crate::types::errors::DownloadError;
use crate::types::settings::{
    DownloadSettings, DEFAULT_BUFFER_SIZE, DEFAULT_EXPORT_POLL_INTERVAL_MS,
    DEFAULT_INDETERMINATE_CAP, DEFAULT_INDETERMINATE_CEILING,
};

/// Extensions reported by [`DownloadManager::list_downloaded_files`].
pub const MEDIA_EXTENSIONS: [&str; 5] = ["mp4", "mov", "m4v", "m4a", "mp3"];

/// Name used when the URL has no usable last path segment.
pub const FALLBACK_FILE_NAME: &str = "video";

/// Container produced by audio-only jobs.
pub const AUDIO_CONTAINER: AudioContainer = AudioContainer::M4a;

/// Share of the overall progress taken by the fetch phase of an audio-only job.
const AUDIO_FETCH_SHARE: f64 = 0.5;

/// Tuning for a [`DownloadManager`].
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub output_dir: PathBuf,
    pub buffer_size: usize,
    pub indeterminate_ceiling: u64,
    pub indeterminate_cap: f64,
    pub export_poll_interval: Duration,
}

impl DownloadConfig {
    /// Default tuning writing into `output_dir`.
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            indeterminate_ceiling: DEFAULT_INDETERMINATE_CEILING,
            indeterminate_cap: DEFAULT_INDETERMINATE_CAP,
            export_poll_interval: Duration::from_millis(DEFAULT_EXPORT_POLL_INTERVAL_MS),
        }
    }

    /// Builds the config from user settings; `default_output_dir` applies when
    /// the settings leave `output_dir` unset.
    pub fn from_settings(settings: &DownloadSettings, default_output_dir: &Path) -> Self {
        let output_dir = settings
            .output_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| default_output_dir.to_path_buf());
        Self {
            output_dir,
            buffer_size: settings.buffer_size.max(1),
            indeterminate_ceiling: settings.indeterminate_ceiling_bytes.max(1),
            indeterminate_cap: settings.indeterminate_progress_cap.clamp(0.0, 1.0),
            export_poll_interval: Duration::from_millis(settings.export_poll_interval_ms.max(1)),
        }
    }
}

/// Fraction of the fetch phase completed after `bytes_read` bytes.
///
/// With a declared length this is `bytes_read / total`, at most 1. Without
/// one it is a cosmetic estimate against `ceiling`, never above `cap`.
pub fn fetch_fraction(bytes_read: u64, total: Option<u64>, ceiling: u64, cap: f64) -> f64 {
    match total {
        Some(total) if total > 0 => (bytes_read as f64 / total as f64).min(1.0),
        _ => (bytes_read as f64 / ceiling.max(1) as f64).min(cap),
    }
}

fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// File name a job writes to: the URL's last path segment, with the audio
/// container's extension for audio-only jobs.
pub fn destination_file_name(url: &Url, kind: DownloadKind) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.last())
        .unwrap_or_default();
    let decoded = urlencoding::decode(segment)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| segment.to_string());

    let mut name = sanitize_file_name(&decoded);
    if name.is_empty() || name == "." || name == ".." {
        name = FALLBACK_FILE_NAME.to_string();
    }

    match kind {
        DownloadKind::Video => name,
        DownloadKind::AudioOnly => Path::new(&name)
            .with_extension(AUDIO_CONTAINER.extension())
            .to_string_lossy()
            .into_owned(),
    }
}

fn fs_error(context: &str, path: &Path, e: std::io::Error) -> DownloadError {
    DownloadError::FileSystemError(format!("{} {}: {}", context, path.display(), e))
}

async fn remove_if_exists(path: &Path) -> Result<(), DownloadError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(fs_error("Failed to remove", path, e)),
    }
}

/// Publishes the progress of one job to the watch channel and the caller's callback.
struct JobReporter<'a> {
    snapshot: &'a watch::Sender<DownloadSnapshot>,
    on_progress: &'a (dyn Fn(f64) + Send + Sync),
    current: DownloadSnapshot,
}

impl<'a> JobReporter<'a> {
    fn start(
        job_id: Uuid,
        url: &Url,
        kind: DownloadKind,
        snapshot: &'a watch::Sender<DownloadSnapshot>,
        on_progress: &'a (dyn Fn(f64) + Send + Sync),
    ) -> Self {
        let reporter = Self {
            snapshot,
            on_progress,
            current: DownloadSnapshot {
                job_id: Some(job_id),
                url: Some(url.to_string()),
                kind: Some(kind),
                bytes_read: 0,
                total_bytes: None,
                fraction: 0.0,
                state: DownloadState::Fetching,
            },
        };
        reporter.publish();
        reporter
    }

    fn job_id(&self) -> Uuid {
        self.current.job_id.unwrap_or_default()
    }

    fn publish(&self) {
        self.snapshot.send_replace(self.current.clone());
    }

    fn set_total(&mut self, total: Option<u64>) {
        self.current.total_bytes = total;
        self.publish();
    }

    /// Never lets the reported fraction move backwards within a job.
    fn report(&mut self, fraction: f64) {
        let fraction = fraction.clamp(0.0, 1.0).max(self.current.fraction);
        self.current.fraction = fraction;
        self.publish();
        (self.on_progress)(fraction);
    }

    fn advance(&mut self, bytes_read: u64, fraction: f64) {
        self.current.bytes_read = bytes_read;
        self.report(fraction);
    }

    fn enter_finalizing(&mut self) {
        self.current.state = DownloadState::Finalizing;
        self.report(AUDIO_FETCH_SHARE);
    }

    fn succeed(&mut self, path: &Path) {
        self.current.state = DownloadState::Succeeded {
            path: path.to_path_buf(),
        };
        self.report(1.0);
    }

    fn fail(&mut self, error: &DownloadError) {
        self.current.state = DownloadState::Failed {
            message: error.to_string(),
        };
        self.current.fraction = 0.0;
        self.publish();
    }
}

/// Download pipeline. Cheap to clone; clones share the job slot and snapshot channel.
#[derive(Clone)]
pub struct DownloadManager {
    client: reqwest::Client,
    exporter: Arc<dyn AudioExporter>,
    config: DownloadConfig,
    slot: Arc<Semaphore>,
    snapshot: Arc<watch::Sender<DownloadSnapshot>>,
}

impl DownloadManager {
    pub fn new(config: DownloadConfig, exporter: Arc<dyn AudioExporter>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("video-pocket/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self::with_client(config, exporter, client)
    }

    pub fn with_client(
        config: DownloadConfig,
        exporter: Arc<dyn AudioExporter>,
        client: reqwest::Client,
    ) -> Self {
        let (snapshot, _) = watch::channel(DownloadSnapshot::default());
        Self {
            client,
            exporter,
            config,
            slot: Arc::new(Semaphore::new(1)),
            snapshot: Arc::new(snapshot),
        }
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// Receiver observing every state and progress change.
    pub fn subscribe(&self) -> watch::Receiver<DownloadSnapshot> {
        self.snapshot.subscribe()
    }

    /// State of the active job, or of the last one if none is active.
    pub fn snapshot(&self) -> DownloadSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.slot.available_permits() == 0
    }

    /// Downloads `url` and returns the final local file.
    pub async fn download(&self, url: &str, kind: DownloadKind) -> Result<PathBuf, DownloadError> {
        self.download_with_progress(url, kind, |_| {}).await
    }

    /// Like [`download`](Self::download), also calling `on_progress` with the
    /// overall fraction after every update.
    pub async fn download_with_progress<F>(
        &self,
        url: &str,
        kind: DownloadKind,
        on_progress: F,
    ) -> Result<PathBuf, DownloadError>
    where
        F: Fn(f64) + Send + Sync,
    {
        let url = Url::parse(url.trim())
            .map_err(|e| DownloadError::InvalidUrl(format!("{}: {}", url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DownloadError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                url.scheme()
            )));
        }
        if youtube::is_youtube_url(url.as_str()) {
            return Err(DownloadError::Unsupported(url.to_string()));
        }

        let _permit = self
            .slot
            .clone()
            .try_acquire_owned()
            .map_err(|_| DownloadError::Busy)?;

        let mut job = JobReporter::start(Uuid::new_v4(), &url, kind, &self.snapshot, &on_progress);
        info!(job_id = %job.job_id(), url = %url, ?kind, "Download started");

        let result = self.run(&url, kind, &mut job).await;
        match &result {
            Ok(path) => {
                job.succeed(path);
                info!(job_id = %job.job_id(), path = %path.display(), "Download finished");
            }
            Err(e) => {
                job.fail(e);
                warn!(job_id = %job.job_id(), url = %url, error = %e, "Download failed");
            }
        }
        result
    }

    async fn run(&self, url: &Url, kind: DownloadKind, job: &mut JobReporter<'_>) -> Result<PathBuf, DownloadError> {
        let output_dir = &self.config.output_dir;
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| fs_error("Failed to create", output_dir, e))?;

        // Temp file is named after the job id.
        let temp_path = output_dir.join(job.job_id().to_string());
        self.fetch(url, &temp_path, kind, job).await?;

        let destination = output_dir.join(destination_file_name(url, kind));
        let result = self.finalize(&temp_path, &destination, kind, job).await;
        if result.is_err() {
            let _ = remove_if_exists(&temp_path).await;
        }
        result
    }

    async fn fetch(
        &self,
        url: &Url,
        temp_path: &Path,
        kind: DownloadKind,
        job: &mut JobReporter<'_>,
    ) -> Result<u64, DownloadError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DownloadError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::InvalidResponse(status.as_u16()));
        }

        let total = response.content_length().filter(|&len| len > 0);
        job.set_total(total);

        let mut file = File::create(temp_path)
            .await
            .map_err(|e| fs_error("Failed to create", temp_path, e))?;
        let result = self.stream_to_file(response, &mut file, total, kind, job).await;
        drop(file);

        match result {
            Ok(bytes_read) => {
                debug!(job_id = %job.job_id(), bytes = bytes_read, "Fetch complete");
                Ok(bytes_read)
            }
            Err(e) => {
                let _ = remove_if_exists(temp_path).await;
                Err(e)
            }
        }
    }

    async fn stream_to_file(
        &self,
        response: reqwest::Response,
        file: &mut File,
        total: Option<u64>,
        kind: DownloadKind,
        job: &mut JobReporter<'_>,
    ) -> Result<u64, DownloadError> {
        let share = match kind {
            DownloadKind::Video => 1.0,
            DownloadKind::AudioOnly => AUDIO_FETCH_SHARE,
        };
        let fraction_at = |bytes_read: u64| {
            share
                * fetch_fraction(
                    bytes_read,
                    total,
                    self.config.indeterminate_ceiling,
                    self.config.indeterminate_cap,
                )
        };

        let buffer_size = self.config.buffer_size;
        let mut buffer: Vec<u8> = Vec::with_capacity(buffer_size);
        let mut bytes_read: u64 = 0;
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| DownloadError::NetworkError(e.to_string()))?;
            buffer.extend_from_slice(&chunk);

            if buffer.len() >= buffer_size {
                file.write_all(&buffer)
                    .await
                    .map_err(|e| DownloadError::FileSystemError(e.to_string()))?;
                bytes_read += buffer.len() as u64;
                buffer.clear();
                job.advance(bytes_read, fraction_at(bytes_read));
            }
        }

        if !buffer.is_empty() {
            file.write_all(&buffer)
                .await
                .map_err(|e| DownloadError::FileSystemError(e.to_string()))?;
            bytes_read += buffer.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| DownloadError::FileSystemError(e.to_string()))?;
        job.advance(bytes_read, fraction_at(bytes_read));

        Ok(bytes_read)
    }

    async fn finalize(
        &self,
        temp_path: &Path,
        destination: &Path,
        kind: DownloadKind,
        job: &mut JobReporter<'_>,
    ) -> Result<PathBuf, DownloadError> {
        if !tokio::fs::try_exists(temp_path).await.unwrap_or(false) {
            return Err(DownloadError::FileNotFound(temp_path.display().to_string()));
        }

        // Overwrite semantics: an earlier file with the same name is replaced.
        remove_if_exists(destination).await?;

        match kind {
            DownloadKind::Video => {
                tokio::fs::rename(temp_path, destination)
                    .await
                    .map_err(|e| fs_error("Failed to move download to", destination, e))?;
            }
            DownloadKind::AudioOnly => {
                job.enter_finalizing();
                let exported = self.extract_audio(temp_path, destination, job).await;
                let _ = remove_if_exists(temp_path).await;
                if exported.is_err() {
                    let _ = remove_if_exists(destination).await;
                }
                exported?;
            }
        }

        Ok(destination.to_path_buf())
    }

    async fn extract_audio(
        &self,
        source: &Path,
        destination: &Path,
        job: &mut JobReporter<'_>,
    ) -> Result<(), DownloadError> {
        let track = self
            .exporter
            .first_audio_track(source)
            .await?
            .ok_or_else(|| DownloadError::ExportFailed("source has no audio track".to_string()))?;

        let preset = ExportPreset::PREFERENCE
            .into_iter()
            .find(|preset| {
                self.exporter
                    .supported_containers(*preset)
                    .contains(&AUDIO_CONTAINER)
            })
            .ok_or_else(|| {
                DownloadError::ExportFailed(format!(
                    "no export preset of '{}' can write .{}",
                    self.exporter.name(),
                    AUDIO_CONTAINER.extension()
                ))
            })?;

        debug!(
            job_id = %job.job_id(),
            exporter = self.exporter.name(),
            ?preset,
            track = track.index,
            "Exporting audio track"
        );

        let request = ExportRequest {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            track,
            preset,
            container: AUDIO_CONTAINER,
        };
        let progress = ExportProgress::new();
        let export = self.exporter.export(&request, &progress);
        tokio::pin!(export);

        let mut ticker = tokio::time::interval(self.config.export_poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                result = &mut export => return result,
                _ = ticker.tick() => {
                    job.report(AUDIO_FETCH_SHARE + progress.get() * (1.0 - AUDIO_FETCH_SHARE));
                }
            }
        }
    }

    /// Media files in the output directory, sorted by name.
    ///
    /// Hidden files and other extensions are skipped; any enumeration error
    /// yields an empty list.
    pub fn list_downloaded_files(&self) -> Vec<PathBuf> {
        let entries = match std::fs::read_dir(&self.config.output_dir) {
            Ok(entries) => entries,
            Err(e) => {
                debug!(dir = %self.config.output_dir.display(), error = %e, "Cannot list downloads");
                return Vec::new();
            }
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                let hidden = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map_or(true, |n| n.starts_with('.'));
                let media = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.to_ascii_lowercase())
                    .is_some_and(|e| MEDIA_EXTENSIONS.contains(&e.as_str()));
                !hidden && media
            })
            .collect();
        files.sort();
        files
    }
}
