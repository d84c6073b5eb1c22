// File: src/storage/sqlite/mod.rs

mod config;
mod convert;
mod messages;
mod schema;
mod store;

pub use config::SqliteConfig;
pub use messages::{
    store_message, StoreOperation, StoreOutcome, StoredMessage, StoredMessageState,
};
pub use store::MessageStore;
