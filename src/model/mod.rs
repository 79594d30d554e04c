//! Core data model: MIME part descriptors, decode outcomes, classification,
//! envelope addresses and board records.

pub mod body;
pub mod classification;
pub mod envelope;
pub mod part;
pub mod record;
