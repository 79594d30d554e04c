//! Email parsing: header blocks, MIME part scanning, and payload decoding.

pub mod decode;
pub mod header;
pub mod mime;
