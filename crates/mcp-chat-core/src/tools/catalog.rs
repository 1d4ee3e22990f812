//! Tool catalog, name filters and the per-query reduced tool set

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use crate::types::{LocalTool, ToolDescriptor, ToolRoute, ToolSpec};

/// Every tool the server offers, keyed by name, in listing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
}

impl ToolCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a tool by name
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Tool names in listing order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    /// Tools matching a filter, in listing order
    pub fn filter(&self, filter: &ToolFilter) -> Vec<ToolDescriptor> {
        self.tools
            .iter()
            .filter(|t| filter.matches(&t.name))
            .cloned()
            .collect()
    }

    /// Listing shown to the user and embedded in the selection prompt.
    ///
    /// A leading newline, then one `` `name`: summary `` line per tool.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for tool in &self.tools {
            let _ = write!(out, "\n`{}`: {}", tool.name, tool.summary());
        }
        if out.is_empty() {
            out.push('\n');
        }
        out
    }
}

impl FromIterator<ToolDescriptor> for ToolCatalog {
    /// A later duplicate replaces the earlier entry in place
    fn from_iter<I: IntoIterator<Item = ToolDescriptor>>(iter: I) -> Self {
        let mut catalog = ToolCatalog::new();
        for tool in iter {
            match catalog.index.get(&tool.name) {
                Some(&i) => catalog.tools[i] = tool,
                None => {
                    catalog.index.insert(tool.name.clone(), catalog.tools.len());
                    catalog.tools.push(tool);
                }
            }
        }
        catalog
    }
}

/// Filter for cutting a catalog down by name
#[derive(Debug, Clone, Default)]
pub struct ToolFilter {
    /// If set, only include tools with these names
    pub include: Option<HashSet<String>>,
    /// Exclude tools with these names
    pub exclude: HashSet<String>,
}

impl ToolFilter {
    /// Match every tool
    pub fn new() -> Self {
        Self::default()
    }

    /// Include only specific tools
    pub fn with_include<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.include = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Exclude specific tools
    pub fn with_exclude<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.exclude = names.into_iter().map(Into::into).collect();
        self
    }

    /// Check if a tool name matches this filter
    pub fn matches(&self, name: &str) -> bool {
        if self.exclude.contains(name) {
            return false;
        }
        match &self.include {
            Some(include) => include.contains(name),
            None => true,
        }
    }
}

/// Tools offered to the conversation loop for one query.
///
/// The remote subset chosen by the selector plus the final-answer tool.
/// Fixed once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReducedToolSet {
    remote: Vec<ToolDescriptor>,
}

impl ReducedToolSet {
    /// Build from a remote subset; local tool names are dropped
    pub fn new(remote: Vec<ToolDescriptor>) -> Self {
        let remote = remote
            .into_iter()
            .filter(|t| LocalTool::from_name(&t.name).is_none())
            .collect();
        Self { remote }
    }

    /// Only the final-answer tool
    pub fn empty() -> Self {
        Self::default()
    }

    /// Selected remote tools, in catalog order
    pub fn remote(&self) -> &[ToolDescriptor] {
        &self.remote
    }

    /// Definitions to send to the LLM: remote tools, then the final-answer tool
    pub fn tool_specs(&self) -> Vec<ToolSpec> {
        self.remote
            .iter()
            .map(ToolSpec::from)
            .chain(std::iter::once(LocalTool::FinalAnswer.spec()))
            .collect()
    }

    /// Where a call to `name` has to go
    pub fn route(&self, name: &str) -> ToolRoute {
        ToolRoute::of(name)
    }
}
