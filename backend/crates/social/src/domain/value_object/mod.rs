//! Value Object Module

pub mod bio;
pub mod caption;
pub mod image_url;
