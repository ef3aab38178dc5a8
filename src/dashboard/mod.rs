//! Web dashboard HTTP server module.
//!
//! Serves the overview, tasks, prompts, schedule and projects pages, the
//! htmx fragments they load, and a small JSON API over the data store.

mod fragments;
mod server;
pub mod templates;

pub use server::{
    DashboardHandle, DashboardServer, DashboardStatus, build_router, start_server,
    start_server_with_retry,
};
