// Launcher shell served over HTTP
//
// Module Organization:
// - state.rs: installed-set view kept in sync by a single watcher task
// - views.rs: HTML templates
// - error.rs: route errors rendered as HTML pages
// - server.rs: axum routes and server lifecycle

pub mod error;
pub mod server;
pub mod state;
pub mod views;

pub use error::ShellError;
pub use server::{router, Server};
pub use state::InstalledApps;
