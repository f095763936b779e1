//! MangaHub database layer.
//!
//! SQLite connection management and schema migrations for the local store.
//!
//! ```no_run
//! use mangahub::database::Database;
//!
//! let db = Database::open("mangahub.db").expect("failed to open database");
//! let conn = db.connection();
//! ```

pub mod connection;
pub mod migrations;

pub use connection::Database;
