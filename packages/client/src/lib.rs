// Growth Club Client - Authorization Core
//
// This crate gates access to the private dashboard behind a remotely-held
// authentication session and a locally-incomplete member profile. The
// decision logic lives in domains/auth: route guards, the passwordless
// sign-in flow, and the callback resolver that reconciles the auth event
// stream with an explicit session check.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;

pub use config::*;
