//! Serialized access to the process-wide route configuration.
//!
//! Tests in one binary run in parallel, but there is a single global
//! configuration. Any test touching it holds a [`GlobalConfigGuard`] for its
//! whole duration; the guard resets the configuration when dropped, even if
//! the test panicked.

use std::sync::{Mutex, MutexGuard, PoisonError};
use validated_routes_web::{configure, reset, Configuration};

static GLOBAL_CONFIG_LOCK: Mutex<()> = Mutex::new(());

/// Exclusive handle on the global configuration for one test.
///
/// # Example
///
/// ```ignore
/// let _guard = GlobalConfigGuard::acquire()
///     .configure(Configuration::with_error_handler(hook));
/// // ... requests observe `hook` as the default override ...
/// // dropped: configuration is back to empty
/// ```
#[must_use = "the configuration is reset as soon as the guard is dropped"]
pub struct GlobalConfigGuard {
    _lock: MutexGuard<'static, ()>,
}

impl GlobalConfigGuard {
    /// Wait for exclusive access and start from an empty configuration.
    pub fn acquire() -> Self {
        let lock = GLOBAL_CONFIG_LOCK
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        reset();
        Self { _lock: lock }
    }

    /// Replace the global configuration while holding the guard.
    pub fn configure(self, config: Configuration) -> Self {
        configure(config);
        self
    }
}

impl Drop for GlobalConfigGuard {
    fn drop(&mut self) {
        reset();
    }
}
