use serde::Serialize;
use std::collections::HashMap;

use crate::error::{AsmError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    addr: usize,
    line: usize,
}

/// Label name to address, filled during pass 1 and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    map: HashMap<String, Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelKV {
    pub addr: usize,
    pub name: String,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, name: &str, addr: usize, line: usize) -> Result<()> {
        if let Some(prev) = self.map.get(name) {
            return Err(AsmError::DuplicateLabel {
                line,
                name: name.to_string(),
                first: prev.line,
            });
        }
        self.map.insert(name.to_string(), Entry { addr, line });
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.map.get(name).map(|e| e.addr)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Sorted by address, then name.
    pub fn to_sorted(&self) -> Vec<LabelKV> {
        let mut v: Vec<LabelKV> = self
            .map
            .iter()
            .map(|(name, e)| LabelKV {
                addr: e.addr,
                name: name.clone(),
            })
            .collect();
        v.sort_by(|a, b| a.addr.cmp(&b.addr).then_with(|| a.name.cmp(&b.name)));
        v
    }
}
