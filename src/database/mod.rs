//! Video Pocket database layer.
//!
//! Provides SQLite connection management and schema migrations. The only
//! table the application writes is the flat `kv_store`, which backs the
//! persisted bookmark list.
//!
//! # Usage
//!
//! ```no_run
//! use video_pocket::database::Database;
//!
//! // Open a persistent database
//! let db = Database::open("videopocket.db").expect("failed to open database");
//!
//! // Or use an in-memory database for testing
//! let db = Database::open_in_memory().expect("failed to open in-memory database");
//!
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
