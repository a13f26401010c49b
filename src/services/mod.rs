// Video Pocket services
// Services provide stateless or self-contained functionality: storage, URL handling, export, playback, settings.

pub mod audio_export;
pub mod kv_store;
pub mod playback;
pub mod settings_engine;
pub mod thumbnail_cache;
pub mod url_normalizer;
pub mod youtube;
