//! Runtime abstraction for system operations.
//!
//! The executor never touches the environment, the clock or the timer directly; it goes
//! through [`Runtime`] so tests can observe rate-limit waits without sleeping.
//!
//! # Structure
//!
//! - `env` - Environment variables
//! - `clock` - Wall clock and async sleep

mod clock;
mod env;

use async_trait::async_trait;
use std::env as std_env;
use std::time::{Duration, SystemTime};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Runtime: Send + Sync {
    // Environment
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError>;

    // Time
    fn now(&self) -> SystemTime;

    /// Suspends the calling task; must not block the worker thread.
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RealRuntime;

#[async_trait]
impl Runtime for RealRuntime {
    fn env_var(&self, key: &str) -> Result<String, std_env::VarError> {
        self.env_var_impl(key)
    }

    fn now(&self) -> SystemTime {
        self.now_impl()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleep_impl(duration).await
    }
}
