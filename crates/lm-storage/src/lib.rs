//! lm-storage: Durable local storage for lovematch.
//!
//! A small key-value abstraction (the terminal stand-in for browser local
//! storage) and the bounded result history persisted through it.
//!
//! # Usage
//!
//! ```no_run
//! use lm_storage::{FileStore, HistoryStore};
//!
//! let store = FileStore::new("/tmp/lovematch");
//! let history = HistoryStore::load(store);
//! println!("{} past results", history.len());
//! ```

pub mod history;
pub mod kv;

pub use history::{HistoryStore, HISTORY_KEY, MAX_HISTORY};
pub use kv::{FileStore, KeyValueStore, MemoryStore, StorageError};
