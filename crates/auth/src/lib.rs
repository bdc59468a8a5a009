//! `storefront-auth` — session-scoped authorization boundary (fail closed).
//!
//! This crate is intentionally decoupled from HTTP and storage: it knows how
//! to turn a credential into a session, a session into a decision, and a
//! decision into "run the operation" or "don't".

pub mod claims;
pub mod gateway;
pub mod password;
pub mod policy;
pub mod requirement;
pub mod resolver;
pub mod roles;
pub mod session;
pub mod token;
pub mod user;

pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use gateway::{DEFAULT_RESOLVE_TIMEOUT, Denial, EntryPoint, Gateway};
pub use password::{MIN_PASSWORD_LEN, PasswordError, decoy_hash, hash_password, verify_decoy, verify_password};
pub use policy::{AuthorizationDecision, evaluate};
pub use requirement::RoleRequirement;
pub use resolver::{ResolveError, SessionResolver, TokenSessionResolver};
pub use roles::{Role, UnknownRole};
pub use session::Session;
pub use storefront_core::SubjectId;
pub use token::{SessionTokens, TokenError};
pub use user::{User, UserPatch, normalize_email};
