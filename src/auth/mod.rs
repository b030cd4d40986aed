//! Authentication module
//!
//! This module provides the OAuth2/OIDC implicit flow for the portal.
//!
//! ## Structure
//!
//! - `store`: Key/value persistence for the token and the pending state value
//! - `session`: Session state machine (login, redirect capture, logout)
//! - `jwt`: Identity token decoding for display
//! - `helpers`: Pure helper functions (fragment parsing, state values, HTTP client)
//! - `handlers`: HTTP handlers for login, callback, and logout flows
//!
//! ## Authentication Flow
//!
//! 1. User posts `/auth/login` → state value stored → redirect to the provider
//! 2. Provider authenticates → redirect to the callback page with `#id_token=…&state=…`
//! 3. Callback page forwards the fragment to `/auth/fragment` → state checked → token stored
//! 4. User posts `/auth/logout` → token dropped locally

pub mod handlers;
pub mod helpers;
pub mod jwt;
pub mod session;
pub mod store;

// Re-export handlers for convenient routing
pub use handlers::{
    callback_handler, fragment_handler, login_handler, logout_handler, session_handler,
};

pub use jwt::{decode_jwt, Claims};
pub use session::{AuthState, FragmentOutcome, LoginError, Session, STATE_KEY, TOKEN_KEY};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
