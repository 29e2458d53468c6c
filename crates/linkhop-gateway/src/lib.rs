//! HTTP front end for linkhop.
//!
//! Routes:
//!
//! - `POST /api/v1/shorten` allocates a short code for `{"long_url": ...}`.
//! - `GET /{short_code}` redirects with `302 Found`.
//! - `GET /api/v1/urls/{short_code}` returns the stored mapping.
//! - `GET /health` answers `{"status": "ok"}`.

pub mod app;
pub mod cli;
pub mod error;
pub mod handlers;
pub mod model;
pub mod server;
pub mod state;

pub use app::App;
pub use state::AppState;
