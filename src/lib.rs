//! School portal client
//!
//! Typed REST client for the school management backend plus the panel
//! runtime the role dashboards are built on: fetch on mount, empty state on
//! failure, optimistic updates, and cancellation on unmount.

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod panels;
pub mod session;
pub mod view;

pub use api::{ApiClient, TutorClient};
pub use config::Config;
pub use error::{ClientError, ClientResult};
pub use session::Session;
