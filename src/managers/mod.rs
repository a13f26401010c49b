// Video Pocket state managers
// Managers own mutable state: the bookmark list and the active download job.

pub mod download_manager;
pub mod video_store;
