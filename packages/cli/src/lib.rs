// ABOUTME: Agentboard server assembly and terminal output helpers
// ABOUTME: Shared by the `agentboard` binary and its integration tests

pub mod middleware;
pub mod output;
pub mod server;

pub use server::{build_app, build_state, init_tracing, run_server};
