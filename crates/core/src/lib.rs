//! Domain core for the garage dealership service.
//!
//! Everything in this crate is free of I/O: entity types, request decoding and
//! validation, the listing filter, upload policy, and the repository and image
//! store traits that the server crate implements.

pub mod auth;
pub mod car;
pub mod enquiry;
pub mod filter;
pub mod id;
pub mod serde;
pub mod storage;
pub mod upload;

pub use id::{RecordId, RecordIdError};
