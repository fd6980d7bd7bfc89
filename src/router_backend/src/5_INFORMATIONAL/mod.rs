//! Informational - read-only views for UIs and monitoring

pub mod display;
