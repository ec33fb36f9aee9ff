//! Authentication orchestration for the two external platforms.

mod auth_traits;
mod authenticator;

pub use auth_traits::{GeoAuthProvider, StoreAuthProvider, StoreUser};
pub use authenticator::Authenticator;
