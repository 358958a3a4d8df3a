//! Value Object Module

pub mod email;
pub mod otp_code;
pub mod user_name;
pub mod user_role;
