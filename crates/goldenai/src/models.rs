//! These models represent the objects a caller builds before dispatching a request
//!
//! Content and messages are provider neutral. Each request variant in [`crate::request`]
//! decides how they are encoded on the wire, and rejects content its provider
//! cannot accept before anything is sent.
pub mod content;
pub mod message;
pub mod provider;
pub mod role;
