//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations used by the domain crates:
//! - Environment configuration helpers
//! - Cryptographic utilities (SHA-256 fingerprints, constant-time compare)
//! - Password hashing (Argon2id)
//! - Cookie handling and client identification
//! - Rate limiting
//! - Key/value cache backends (Redis, in-process LRU)
//! - Outbound mail transport

pub mod cache;
pub mod client;
pub mod config;
pub mod cookie;
pub mod crypto;
pub mod mail;
pub mod password;
pub mod rate_limit;
