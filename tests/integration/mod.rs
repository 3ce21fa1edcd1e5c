//! Integration tests for saiku-embed.

pub mod common;
pub mod dispatch_test;
pub mod request_test;
