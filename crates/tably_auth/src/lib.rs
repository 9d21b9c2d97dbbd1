// --- File: crates/tably_auth/src/lib.rs ---
pub mod error;
pub mod extract; // Token lookup on incoming requests
pub mod otp;
pub mod phone;
pub mod sessions;
pub mod token;

pub use error::AuthError;
pub use extract::{authenticate, bearer_or_cookie};
pub use otp::OtpEngine;
pub use sessions::{SessionRecord, SessionRegistry};
pub use token::TokenService;
