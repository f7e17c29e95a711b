//! MessageStore 実装
//!
//! - `inmemory`: プロセス内メモリを使った実装
//! - 将来的に: PostgreSQL など

pub mod inmemory;

pub use inmemory::InMemoryMessageStore;
