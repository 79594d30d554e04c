//! `mailboard` — inbound email ingestion for a personal blog.
//!
//! This crate extracts a clean plaintext snippet from raw MIME messages,
//! classifies message-board submissions by their subject line, and wires the
//! result into persistence, notification and reply collaborators.

pub mod config;
pub mod error;
pub mod handler;
pub mod ingest;
pub mod model;
pub mod notify;
pub mod parser;
pub mod reply;
pub mod store;
