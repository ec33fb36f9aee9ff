//! Token server for the relief mapping dashboard.
//!
//! Users who are not allow-listed on the geospatial analysis backend
//! still need read access to its assets. This service mints read-only
//! backend access tokens from a service account and hands them to
//! signed-in dashboard users from approved origins. Because tokens need
//! not be unique per user, one cached token is shared until it nears
//! expiry.

pub mod api;
pub mod config;
pub mod minter;
pub mod token_cache;
pub mod verify;

mod main_lib;

pub use main_lib::{build_state, init_tracing, AppState};
