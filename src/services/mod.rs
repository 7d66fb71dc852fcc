//! Long-running tasks built on top of the engine.

pub mod session;
