pub mod download;
pub mod errors;
pub mod settings;
pub mod video;
