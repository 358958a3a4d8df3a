//! Shared Kernel
//!
//! Vocabulary every backend crate agrees on:
//! - the application error type and its HTTP mapping
//! - typed identifiers for accounts and posts
//!
//! Anything domain specific belongs in the owning crate, not here.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
