use crate::det::HalfDet;
use crate::error::SystemError;
use std::collections::HashMap;

/// Cache of per-spin diagonal contributions keyed by `HalfDet`.
///
/// The cache never decides a result; a miss only means the caller has to do the
/// full evaluation itself. `built_for` remembers which basis version the last
/// rebuild saw, so callers can tell when the basis grew past it.
#[derive(Debug, Clone, Default)]
pub struct DiagHelper {
    entries: HashMap<HalfDet, f64>,
    built_for: Option<u64>,
}

impl DiagHelper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, half: &HalfDet) -> Result<f64, SystemError> {
        self.entries
            .get(half)
            .copied()
            .ok_or_else(|| SystemError::NotFound(half.clone()))
    }

    pub fn put(&mut self, half: HalfDet, value: f64) {
        self.entries.insert(half, value);
    }

    pub fn contains(&self, half: &HalfDet) -> bool {
        self.entries.contains_key(half)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.built_for = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn mark_built(&mut self, version: u64) {
        self.built_for = Some(version);
    }

    pub fn is_stale(&self, version: u64) -> bool {
        self.built_for != Some(version)
    }
}
