//! API request handlers.

/// Health check handler.
pub mod health;
/// Research session handlers (start, status poll).
pub mod research;
