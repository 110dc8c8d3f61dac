//! # Validated Routes Testing
//!
//! Testing utilities and helpers for validated routes.
//!
//! This crate provides:
//! - [`Probe`]: counts handler invocations (e.g. to prove a handler never ran)
//! - [`RouteTest`]: fluent one-shot requests against an Axum `Router`
//! - [`GlobalConfigGuard`]: serialized access to the process-wide
//!   configuration, reset on drop
//!
//! ## Example
//!
//! ```ignore
//! use validated_routes_testing::{Probe, RouteTest};
//!
//! #[tokio::test]
//! async fn test_invalid_input_skips_handler() {
//!     let probe = Probe::new();
//!     let app = user_routes(probe.clone());
//!
//!     RouteTest::new(app)
//!         .post("/users")
//!         .json(&json!({ "name": "John", "id": 123 }))
//!         .send()
//!         .await
//!         .assert_status(StatusCode::BAD_REQUEST);
//!
//!     probe.assert_not_called();
//! }
//! ```

pub mod global;

/// Mock implementations for testing.
pub mod mocks {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Side-effecting probe counting how often a handler ran.
    ///
    /// Clones share the same counter.
    ///
    /// # Example
    ///
    /// ```
    /// use validated_routes_testing::Probe;
    ///
    /// let probe = Probe::new();
    /// let inner = probe.clone();
    /// inner.hit();
    /// assert_eq!(probe.count(), 1);
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct Probe {
        hits: Arc<AtomicUsize>,
    }

    impl Probe {
        /// Create a probe with a zero count.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Record one invocation.
        pub fn hit(&self) {
            self.hits.fetch_add(1, Ordering::SeqCst);
        }

        /// Number of recorded invocations.
        #[must_use]
        pub fn count(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }

        /// Assert the probe never fired.
        ///
        /// # Panics
        ///
        /// Panics if [`Probe::hit`] was called.
        pub fn assert_not_called(&self) {
            assert_eq!(self.count(), 0, "probe fired but was expected not to");
        }
    }
}

/// Install a `tracing` subscriber that writes through the test harness.
///
/// Safe to call from every test; only the first call installs.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "validated_routes_web=debug".into()),
        )
        .with_test_writer()
        .try_init();
}

// Re-export commonly used items
pub use global::GlobalConfigGuard;
pub use mocks::Probe;
pub use route_test::{RouteTest, TestResponse};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_shared_between_clones() {
        let probe = Probe::new();
        let clone = probe.clone();
        clone.hit();
        clone.hit();
        assert_eq!(probe.count(), 2);
    }

    #[test]
    fn test_init_tracing_twice() {
        init_test_tracing();
        init_test_tracing();
    }
}
