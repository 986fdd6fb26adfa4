//! Small shared utilities.

use cfg_if::cfg_if;

pub mod debounce;

// Monotonic clock shared by the core: std on native, performance.now() on wasm.
cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub use web_time::{Duration, Instant};
    } else {
        pub use std::time::{Duration, Instant};
    }
}
