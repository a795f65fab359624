// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use tempfile::TempDir;

use super::{BrokenCheck, FixedCheck};
use crate::{AppConfig, ConfigError, ConfigStore, SetupCheck, SetupGate};

/// Reports "incomplete" on its first run while configuration is saved
/// concurrently, then "complete" afterwards.
#[derive(Default)]
struct SavedDuringCheck {
    gate: OnceLock<Weak<SetupGate>>,
    calls: AtomicUsize,
}

impl SetupCheck for SavedDuringCheck {
    fn is_setup_complete(&self) -> Result<bool, ConfigError> {
        let first: bool = self.calls.fetch_add(1, Ordering::SeqCst) == 0;
        if let Some(gate) = self.gate.get().and_then(Weak::upgrade).filter(|_| first) {
            gate.invalidate();
        }
        Ok(!first)
    }
}

#[test]
fn test_gate_evaluates_lazily_and_caches() {
    let check = Arc::new(FixedCheck::new(true));
    let gate = SetupGate::new(check.clone());

    assert_eq!(check.calls(), 0);
    assert!(gate.is_open());
    assert!(gate.is_open());
    assert_eq!(check.calls(), 1);
}

#[test]
fn test_closed_answer_is_cached_too() {
    let check = Arc::new(FixedCheck::new(false));
    let gate = SetupGate::new(check.clone());

    assert!(!gate.is_open());
    assert!(!gate.is_open());
    assert_eq!(check.calls(), 1);
}

#[test]
fn test_invalidate_forces_recheck() {
    let check = Arc::new(FixedCheck::new(true));
    let gate = SetupGate::new(check.clone());

    assert!(gate.is_open());
    gate.invalidate();
    assert!(gate.is_open());
    assert_eq!(check.calls(), 2);
}

#[test]
fn test_check_error_closes_gate() {
    let gate = SetupGate::new(Arc::new(BrokenCheck));

    assert!(!gate.is_open());
}

#[test]
fn test_setup_completion_is_seen_after_invalidate() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(ConfigStore::new(dir.path().join("config.json")));
    let gate = SetupGate::new(store.clone());

    assert!(!gate.is_open());

    store
        .save(&AppConfig {
            setup_complete: true,
            database_config: Some(super::embedded_descriptor(dir.path())),
        })
        .unwrap();
    assert!(!gate.is_open(), "cached answer survives until invalidated");

    gate.invalidate();
    assert!(gate.is_open());
}

#[test]
fn test_answer_from_before_invalidate_is_not_cached() {
    let check = Arc::new(SavedDuringCheck::default());
    let gate = Arc::new(SetupGate::new(check.clone()));
    check.gate.set(Arc::downgrade(&gate)).unwrap();

    assert!(!gate.is_open(), "the in-flight answer is still returned");
    assert!(gate.is_open(), "but not cached past the invalidation");
    assert!(gate.is_open());
    assert_eq!(check.calls.load(Ordering::SeqCst), 2);
}
