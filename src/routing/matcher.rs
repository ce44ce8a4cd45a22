//! Path matching for bypass and scope rules.
//!
//! # Responsibilities
//! - Match exact paths (`/sw.js`)
//! - Match path prefixes (`/_next/`, `/api/`)
//! - Match file-like paths (last segment has an extension)
//! - Combine matchers with OR semantics
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Empty `AnyMatcher` never matches
//! - No regex to guarantee O(n) matching

use std::fmt;

use crate::config::BypassConfig;

/// Trait for matching request paths against a condition.
pub trait PathMatcher: Send + Sync + fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches one path exactly.
#[derive(Debug, Clone)]
pub struct ExactPathMatcher {
    path: String,
}

impl ExactPathMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl PathMatcher for ExactPathMatcher {
    fn matches(&self, path: &str) -> bool {
        path == self.path
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl PathMatcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Matches paths whose last segment contains a `.` (`/icons/a.png`).
#[derive(Debug, Clone, Default)]
pub struct FileExtensionMatcher;

impl PathMatcher for FileExtensionMatcher {
    fn matches(&self, path: &str) -> bool {
        let last_segment = path.rsplit('/').next().unwrap_or(path);
        last_segment.contains('.')
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug, Default)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn PathMatcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn PathMatcher>>) -> Self {
        Self { matchers }
    }
}

impl PathMatcher for AnyMatcher {
    fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }
}

/// Compiled bypass and scope patterns.
#[derive(Debug, Default)]
pub struct BypassRules {
    /// Evaluated by the engine; a match yields `Pass`.
    bypass: AnyMatcher,
    /// Outside the engine's scope; forwarded without evaluation.
    excluded: AnyMatcher,
}

impl BypassRules {
    pub fn from_config(config: &BypassConfig) -> Self {
        let mut bypass: Vec<Box<dyn PathMatcher>> = Vec::new();
        if config.file_extensions {
            bypass.push(Box::new(FileExtensionMatcher));
        }
        for path in &config.exact_paths {
            bypass.push(Box::new(ExactPathMatcher::new(path.clone())));
        }
        for prefix in &config.prefixes {
            bypass.push(Box::new(PathPrefixMatcher::new(prefix.clone())));
        }

        let mut excluded: Vec<Box<dyn PathMatcher>> = Vec::new();
        for path in &config.excluded_paths {
            excluded.push(Box::new(ExactPathMatcher::new(path.clone())));
        }
        for prefix in &config.excluded_prefixes {
            excluded.push(Box::new(PathPrefixMatcher::new(prefix.clone())));
        }

        Self {
            bypass: AnyMatcher::new(bypass),
            excluded: AnyMatcher::new(excluded),
        }
    }

    /// Static asset or internal path: never redirected or rewritten.
    pub fn is_bypassed(&self, path: &str) -> bool {
        self.bypass.matches(path)
    }

    /// Whether the engine should see this path at all.
    pub fn in_scope(&self, path: &str) -> bool {
        !self.excluded.matches(path)
    }
}
