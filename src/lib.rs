//! Flag quiz core: catalog, round engine, persistence, and the async session
//! driver. Front ends talk to a running game through `SessionHandle` and
//! render `GameView` snapshots.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod provider;
pub mod services;
pub mod state;
pub mod store;
pub mod terminal;
