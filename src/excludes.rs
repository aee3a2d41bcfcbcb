//! Fields to leave out of reachability computations.
//!
//! The navigator only stores the policy; whoever computes reachability consults it.

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::path::Path;

use anyhow::{Context, Result};

pub trait ReachableExcludes: Debug {
    /// `field` is a fully qualified `Class.field` name.
    fn is_excluded(&self, field: &str) -> bool;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExcludedFields {
    fields: BTreeSet<String>,
}

impl ExcludedFields {
    /// One field per line; blank lines and `#` comments are ignored.
    pub fn parse(text: &str) -> Self {
        let fields = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_string)
            .collect();
        Self { fields }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read excludes file: {}", path.display()))?;
        Ok(Self::parse(&text))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl ReachableExcludes for ExcludedFields {
    fn is_excluded(&self, field: &str) -> bool {
        self.fields.contains(field)
    }
}
