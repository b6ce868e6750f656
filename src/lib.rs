//! Karmicup - reciprocal engagement marketplace for Reddit
//!
//! Members spend points to submit Reddit posts and comments, and earn points
//! back by upvoting and commenting on other members' submissions. Every claimed
//! action is verified against Reddit's public JSON API before it is credited.
//!
//! ## Components
//!
//! - **Reddit**: URL resolution and a retrying read client
//! - **Ledger store**: accounts, linked identities, submissions and
//!   interaction records (MongoDB or in-memory)
//! - **Services**: intake, verification, status toggle, read models
//! - **Server**: hyper HTTP API with JWT authentication

pub mod auth;
pub mod config;
pub mod db;
pub mod reddit;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{KarmaError, Result};
