//! Lead/account submission client, wire types, and the mocked backend.

pub mod client;
pub mod mock;
pub mod types;

pub use client::{HttpApiClient, LeadApi};
pub use types::{AccountPayload, ApiErrorBody, ApiResponse, LeadPayload, ResponseStatus};
