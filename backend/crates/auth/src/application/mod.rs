//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod config;
pub mod login;
pub mod logout;
pub mod otp;
pub mod register;
pub mod session;
pub mod token;
pub mod verify_otp;

// Re-exports
pub use authenticate::{AuthenticateUseCase, AuthenticatedAccount, GateOutcome};
pub use config::AuthConfig;
pub use login::{LoginInput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use otp::{OtpChallengeManager, OtpDispatcher, OtpDispatcherConfig};
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use session::IssuedSession;
pub use token::{Claims, TokenKind, TokenService};
pub use verify_otp::{VerifyOtpInput, VerifyOtpOutput, VerifyOtpUseCase};
