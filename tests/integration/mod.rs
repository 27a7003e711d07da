//! Integration Tests Module
//!
//! Every panel is driven against an axum mock backend on an ephemeral port.


mod api_client_tests;
mod messaging_tests;
mod payments_tests;
mod resilience_tests;
mod tutor_tests;
