#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once_force(|_| {
        let _ = env_logger::Builder::new()
            .filter_level(log::LevelFilter::Warn)
            .filter_module("chain_table", log::LevelFilter::Debug)
            .is_test(true)
            .parse_default_env()
            .try_init();
    });
}

/// Payload that bumps a shared counter when destroyed.
#[derive(Debug)]
pub struct Counted {
    pub label: &'static str,
    drops: Rc<Cell<usize>>,
}

impl Counted {
    pub fn new(label: &'static str, drops: &Rc<Cell<usize>>) -> Self {
        Self {
            label,
            drops: drops.clone(),
        }
    }
}

impl Drop for Counted {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

// Keys compare and hash by label, so `&str` lookups find them.
impl PartialEq for Counted {
    fn eq(&self, other: &Self) -> bool {
        self.label == other.label
    }
}

impl Eq for Counted {}

impl std::hash::Hash for Counted {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.label.hash(state);
    }
}

impl std::borrow::Borrow<str> for Counted {
    fn borrow(&self) -> &str {
        self.label
    }
}
