//! API module for the portal client
//!
//! REST access to the school backend and the external tutor webhook.

pub mod client;
pub mod endpoints;
pub mod school;
pub mod tutor;

pub use client::{ApiClient, RequestOptions};
pub use endpoints::Endpoint;
pub use tutor::{TutorClient, TutorRequest};
