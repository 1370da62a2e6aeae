//! ISUketch render server.
//!
//! Serves the ISUketch drawing application with server-side rendering. Page
//! requests are resolved against a client route table, their data is loaded
//! from the backend API, and the rendered markup is cached per URL and
//! embedded in a document together with a hydration script and a fresh
//! CSRF token.
//!
//! # Architecture
//!
//! - **Resolve**: Matches URLs to views and the backend data each one needs
//! - **Load**: Fetches a CSRF token and the view's data from the backend
//! - **Render**: Generates view and canvas markup using maud (compile-time templates)
//! - **Cache**: Rendered markup and hydration per URL, in moka or Redis
//! - **Snapshot**: Renders a room's canvas to an SVG file and serves it
//!
//! # URL Pattern
//!
//! ```text
//! GET /            room list
//! GET /rooms       redirect to /
//! GET /rooms/{id}  room page
//! GET /img/{id}    room snapshot (SVG)
//! ANY /api/*       forwarded to the backend
//! ```
//!
//! # Security
//!
//! - All dynamic content is HTML-escaped by maud
//! - Hydration JSON is escaped so it cannot close its `<script>` element
//! - The CSRF token is never cached and never shared between responses

pub mod api;
pub mod cache;
pub mod config;
pub mod document;
pub mod error;
pub mod loader;
pub mod render;
pub mod resolve;
pub mod routes;
pub mod snapshot;
pub mod state;

pub use config::Config;
pub use routes::router;
pub use state::AppState;
