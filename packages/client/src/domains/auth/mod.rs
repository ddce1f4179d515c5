//! Authorization resolution core: identifier handling, route guards, the
//! passwordless sign-in flow, registration completion, and the callback
//! resolver.

pub mod callback;
pub mod guards;
pub mod identifier;
pub mod login;
pub mod models;
pub mod registration;

pub use callback::{CallbackLocation, CallbackOutcome, CallbackResolver};
pub use guards::{
    decide_for_route, require_admin, require_completed_registration, require_session,
};
pub use identifier::{
    classify, is_email, is_valid_phone, normalize_email, normalize_to_e164, IdentifierKind,
};
pub use login::{LoginFlow, LoginState};
pub use models::{
    Profile, ProfileChanges, RegistrationData, RegistrationStatus, Session, SessionUser,
};
pub use registration::{RegistrationFlow, RegistrationForm, RegistrationState};
