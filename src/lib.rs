//! otcmarket - Telegram OTC marketplace client
//!
//! This library provides the client-side core of the marketplace Mini App:
//! debounced listing search grouped by category, a listing detail modal, a
//! contact-the-seller flow and transient notifications.
//!
//! ## Architecture
//!
//! The [`App`] core is headless. It is driven by user actions and by
//! [`AppEvent`]s from a request worker, and is rendered by two front-ends:
//! - **Native**: a terminal client (`otcmarket`) printing view trees or JSON
//! - **Web**: a DOM front-end (`otcmarket-web-dom`) running inside Telegram
//!
//! ## Usage
//!
//! For native builds:
//! ```bash
//! cargo build --features native
//! ```
//!
//! For web builds:
//! ```bash
//! trunk build --features dom-web
//! ```

// Core modules (available on all platforms)
pub mod config;
pub mod constants;
pub mod format;
pub mod types;

// View-model state machines
pub mod contact;
pub mod grouping;
pub mod notify;

// Typed UI trees shared by both front-ends
pub mod view;

pub mod app;

// Deep link router (available on all platforms)
pub mod router;

// Debug logging system (available on all platforms)
pub mod debug;

// UI snapshot types for DOM-based rendering (all platforms)
pub mod ui_snapshot;

// Marketplace HTTP API and the request worker in front of it
pub mod api;
pub mod source_api;

// Host bridge (Telegram in the browser, static on the terminal)
pub mod host;

// WASM-specific JavaScript bridge (no-ops on native)
pub mod webshim;

// DOM materialization, browser only
#[cfg(target_arch = "wasm32")]
pub mod dom;

// Utility modules (shared across all targets)
pub mod util;

// Re-export commonly used types
pub use app::App;
pub use config::Config;
pub use types::{ApiRequest, AppEvent};
pub use ui_snapshot::{UiAction, UiSnapshot};
