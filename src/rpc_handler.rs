//! RPC method handler for the Video Pocket JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! The `handle_method` function dispatches JSON-RPC method calls to the
//! appropriate managers and services via the `App` struct.
//!
//! Downloads run on the tokio runtime behind `runtime`; their outcome arrives
//! later as a `download.finished` event on the app's event channel.

use std::sync::Mutex;

use serde_json::{json, Value};
use tokio::runtime::Handle;
use tracing::warn;
use uuid::Uuid;

use crate::app::App;
use crate::managers::video_store::VideoStoreTrait;
use crate::services::playback::PlaybackTarget;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::services::youtube;
use crate::types::download::DownloadKind;
use crate::types::errors::{DownloadError, StoreError};
use crate::types::video::YOUTUBE_CACHE_PREFIX;

fn param_str<'a>(params: &'a Value, name: &'static str) -> Result<&'a str, String> {
    params
        .get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", name))
}

fn param_uuid(params: &Value) -> Result<Uuid, String> {
    let id = param_str(params, "id")?;
    Uuid::parse_str(id).map_err(|e| format!("invalid id: {}", e))
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub fn handle_method(
    app: &Mutex<App>,
    runtime: &Handle,
    method: &str,
    params: &Value,
) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true, "version": env!("CARGO_PKG_VERSION")})),

        // ─── Videos ───
        "video.add" => {
            let url = param_str(params, "url")?;
            let title = params.get("title").and_then(|v| v.as_str()).unwrap_or("");
            let mut a = app.lock().map_err(|e| e.to_string())?;
            match a.video_store.add_normalized(url, title) {
                Ok(video) => Ok(json!({"video": video, "persisted": true})),
                // The bookmark is kept in memory; report that it was not saved.
                Err(StoreError::Persistence(msg)) => {
                    warn!(error = %msg, "Added video was not persisted");
                    let video = a.video_store.videos().last().cloned();
                    Ok(json!({"video": video, "persisted": false, "error": msg}))
                }
                Err(e) => Err(e.to_string()),
            }
        }
        "video.list" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let items: Vec<Value> = a
                .video_store
                .videos()
                .iter()
                .map(|v| {
                    json!({
                        "id": v.id,
                        "title": v.title,
                        "urlString": v.url_string,
                        "dateAdded": v.date_added,
                        "isYouTube": v.is_youtube(),
                        "thumbnailCached": a.thumbnails().contains(&v.cache_key()),
                    })
                })
                .collect();
            Ok(json!({"items": items}))
        }
        "video.delete" => {
            let id = param_uuid(params)?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let removed = a.video_store.remove_video(&id).map_err(|e| e.to_string())?;
            Ok(json!({"removed": removed}))
        }
        "video.delete_many" => {
            let indices: Vec<usize> = params
                .get("indices")
                .cloned()
                .ok_or("missing indices")
                .and_then(|v| serde_json::from_value(v).map_err(|_| "invalid indices"))?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            let removed = a.video_store.remove_videos(&indices).map_err(|e| e.to_string())?;
            Ok(json!({"removed": removed}))
        }
        "video.playback" => {
            let id = param_uuid(params)?;
            let a = app.lock().map_err(|e| e.to_string())?;
            let video = a.video_store.get(&id).ok_or("video not found")?;
            let target = PlaybackTarget::for_url(&video.url_string);
            Ok(json!({
                "target": target,
                "allowsDownload": target.allows_download(),
                "loadTimeoutSecs": a.load_timeout().as_secs(),
            }))
        }

        // ─── Downloads ───
        "download.start" => {
            let url = param_str(params, "url")?.to_string();
            let kind: DownloadKind = match params.get("kind") {
                Some(v) => serde_json::from_value(v.clone()).map_err(|e| format!("invalid kind: {}", e))?,
                None => DownloadKind::Video,
            };
            let (manager, events) = {
                let a = app.lock().map_err(|e| e.to_string())?;
                if a.download_manager.is_busy() {
                    return Err(DownloadError::Busy.to_string());
                }
                (a.download_manager.clone(), a.event_sender())
            };

            let job_url = url.clone();
            runtime.spawn(async move {
                let event = match manager.download(&job_url, kind).await {
                    Ok(path) => json!({
                        "event": "download.finished",
                        "url": job_url,
                        "ok": true,
                        "path": path.to_string_lossy(),
                    }),
                    Err(e) => json!({
                        "event": "download.finished",
                        "url": job_url,
                        "ok": false,
                        "error": e.to_string(),
                    }),
                };
                let _ = events.send(event);
            });
            Ok(json!({"started": true, "url": url, "kind": kind}))
        }
        "download.status" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            serde_json::to_value(a.download_manager.snapshot()).map_err(|e| e.to_string())
        }
        "download.files" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let files: Vec<String> = a
                .download_manager
                .list_downloaded_files()
                .iter()
                .map(|p| p.to_string_lossy().into_owned())
                .collect();
            Ok(json!({"files": files}))
        }

        // ─── Thumbnails ───
        "thumbnail.fetch" => {
            let video_id = match params.get("video_id").and_then(|v| v.as_str()) {
                Some(id) => id.to_string(),
                None => {
                    let url = param_str(params, "url")?;
                    youtube::extract_video_id(url).ok_or("not a YouTube video URL")?
                }
            };
            let (cache, client, base_url) = {
                let a = app.lock().map_err(|e| e.to_string())?;
                (
                    a.thumbnails().clone(),
                    a.http.clone(),
                    a.settings_engine.get_settings().thumbnails.youtube_base_url.clone(),
                )
            };
            let key = format!("{}{}", YOUTUBE_CACHE_PREFIX, video_id);
            if cache.contains(&key) {
                let path = cache.cache_path(&key);
                return Ok(json!({"path": path.to_string_lossy(), "cached": true}));
            }
            let path = runtime
                .block_on(cache.fetch_youtube(&client, &base_url, &video_id))
                .map_err(|e| e.to_string())?;
            Ok(json!({"path": path.to_string_lossy(), "cached": false}))
        }

        // ─── Settings ───
        "settings.get" => {
            let a = app.lock().map_err(|e| e.to_string())?;
            let settings = a.settings_engine.get_settings();
            serde_json::to_value(settings).map_err(|e| e.to_string())
        }
        "settings.set" => {
            let key = param_str(params, "key")?;
            let value = params.get("value").cloned().ok_or("missing value")?;
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.settings_engine.set_value(key, value).map_err(|e| e.to_string())?;
            let applied = !key.starts_with("downloads") || a.reload_downloads();
            Ok(json!({"ok": true, "applied": applied}))
        }
        "settings.reset" => {
            let mut a = app.lock().map_err(|e| e.to_string())?;
            a.settings_engine.reset().map_err(|e| e.to_string())?;
            let applied = a.reload_downloads();
            Ok(json!({"ok": true, "applied": applied}))
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
