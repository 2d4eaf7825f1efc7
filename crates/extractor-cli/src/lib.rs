//! Extractor CLI Library
//!
//! One-shot operations against the same storage, queue and upstream the
//! server uses:
//!
//! - **run**: a single extraction without the HTTP server
//! - **cursor**: inspect or repair the durable resume point
//! - **reannounce**: publish jobs again for chunks already in storage

pub mod commands;
