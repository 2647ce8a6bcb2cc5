#![cfg(test)]

// Shared helpers for the in-crate tests: a once-only logger and payloads
// that record how often each one was destroyed.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::Once;

use env_logger::Builder;
use log::LevelFilter;

static INIT: Once = Once::new();

pub(crate) fn init_test_logger() {
    INIT.call_once_force(|_| {
        let mut builder = Builder::new();
        builder
            .filter_level(LevelFilter::Warn)
            .filter_module("chain_table", LevelFilter::Debug)
            .is_test(true)
            .parse_default_env();
        let _ = builder.try_init();
    });
}

/// Destruction counts per payload name.
#[derive(Clone, Default)]
pub(crate) struct DropLog(Rc<RefCell<HashMap<String, usize>>>);

impl DropLog {
    /// A payload whose destruction is recorded.
    pub(crate) fn track(&self, name: &str) -> Tracked {
        Tracked {
            name: name.to_string(),
            log: Some(self.clone()),
        }
    }

    /// A lookup key equal to `track(name)` whose own drop is not recorded.
    pub(crate) fn probe(&self, name: &str) -> Tracked {
        Tracked {
            name: name.to_string(),
            log: None,
        }
    }

    pub(crate) fn drops_of(&self, name: &str) -> usize {
        self.0.borrow().get(name).copied().unwrap_or(0)
    }

    pub(crate) fn total(&self) -> usize {
        self.0.borrow().values().sum()
    }
}

/// Payload identified by name; equality and hashing ignore the log.
pub(crate) struct Tracked {
    name: String,
    log: Option<DropLog>,
}

impl Tracked {
    pub(crate) fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        if let Some(log) = &self.log {
            *log.0.borrow_mut().entry(self.name.clone()).or_insert(0) += 1;
        }
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Tracked {}

impl Hash for Tracked {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::borrow::Borrow<str> for Tracked {
    fn borrow(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Tracked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)
    }
}
