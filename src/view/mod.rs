//! View runtime: panel state, lifecycle, polling, and alerts.

pub mod alert;
pub mod lifecycle;
pub mod panel;
pub mod poller;
pub mod state;

pub use alert::{Alert, AlertSlot};
pub use lifecycle::{CancelToken, FetchSlot, Lifecycle};
pub use panel::{LoadOutcome, Panel};
pub use poller::Poller;
pub use state::{Phase, PanelState};
