//! Bitunix perpetual-futures exchange integration

pub mod auth;
pub mod client;
pub mod types;

pub use auth::{sign_request, Credentials};
pub use client::{BitunixClient, ClientConfig, API_BASE_URL};
