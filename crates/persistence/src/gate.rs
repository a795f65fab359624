// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The setup gate.
//!
//! Until setup has completed there may be no database to talk to, so audit
//! reads return nothing and audit writes are skipped. The gate answers "is
//! setup complete?" and caches the answer for the life of the process.
//!
//! ## Lifecycle
//!
//! 1. The first call to [`SetupGate::is_open`] runs the injected
//!    [`SetupCheck`] and caches its result, whether open or closed.
//! 2. Later calls are served from the cache.
//! 3. [`SetupGate::invalidate`] clears the cache. The setup and
//!    reconfiguration flows call it after saving configuration, so the next
//!    call re-runs the check.

use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

use crate::config::ConfigError;

/// Decides whether setup has completed.
///
/// Implementations must not open database connections.
pub trait SetupCheck: Send + Sync {
    /// Returns whether setup is complete.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying configuration cannot be read or is
    /// invalid. The gate treats any error as "not complete".
    fn is_setup_complete(&self) -> Result<bool, ConfigError>;
}

/// The cached answer and how many times it has been invalidated.
#[derive(Debug, Default)]
struct Cache {
    answer: Option<bool>,
    generation: u64,
}

/// Cached answer to "is setup complete?".
pub struct SetupGate {
    check: Arc<dyn SetupCheck>,
    cached: RwLock<Cache>,
}

impl std::fmt::Debug for SetupGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetupGate")
            .field("cached", &self.cached)
            .finish_non_exhaustive()
    }
}

impl SetupGate {
    /// Creates a gate that consults `check` lazily.
    #[must_use]
    pub fn new(check: Arc<dyn SetupCheck>) -> Self {
        Self {
            check,
            cached: RwLock::new(Cache::default()),
        }
    }

    /// Returns whether setup is complete.
    ///
    /// Never fails: a check error closes the gate and is logged.
    ///
    /// The check runs without holding the lock. Its answer is cached only if
    /// no [`invalidate`](Self::invalidate) happened while it ran.
    #[must_use]
    pub fn is_open(&self) -> bool {
        let generation: u64 = {
            let cache = self.cached.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(open) = cache.answer {
                return open;
            }
            cache.generation
        };

        let open: bool = match self.check.is_setup_complete() {
            Ok(open) => open,
            Err(e) => {
                warn!(error = %e, "Setup check failed; treating setup as incomplete");
                false
            }
        };

        let stored: bool = {
            let mut cache = self.cached.write().unwrap_or_else(PoisonError::into_inner);
            let current: bool = cache.generation == generation;
            if current {
                cache.answer = Some(open);
            }
            current
        };
        if stored {
            info!(open, "Setup gate evaluated");
        } else {
            debug!(open, "Setup gate invalidated during check; answer not cached");
        }
        open
    }

    /// Discards the cached answer so the next [`is_open`](Self::is_open)
    /// re-runs the check.
    pub fn invalidate(&self) {
        {
            let mut cache = self.cached.write().unwrap_or_else(PoisonError::into_inner);
            cache.answer = None;
            cache.generation = cache.generation.wrapping_add(1);
        }
        info!("Setup gate invalidated");
    }
}
