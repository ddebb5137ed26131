//! HTTP request handlers for the pixel API.

pub mod health;
pub mod pixels;
