//! Data models for tokens, extracted documents and configuration.

pub mod config;
pub mod document;
pub mod token;
