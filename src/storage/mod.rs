// File: src/storage/mod.rs

pub mod sqlite;

pub use sqlite::{
    store_message, MessageStore, SqliteConfig, StoreOperation, StoreOutcome, StoredMessage,
    StoredMessageState,
};
