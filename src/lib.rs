pub mod charts;
pub mod config;
pub mod context;
pub mod error;
pub mod export;
pub mod fake_feed;
pub mod filter;
pub mod match_history;
pub mod participation;
pub mod raw_export;
pub mod roster;
pub mod schema;
pub mod state;
