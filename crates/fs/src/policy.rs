use std::{fmt, str::FromStr};

use dirbase_runtime::{
    NORMAL_EXCLUDED_EXTS, NORMAL_EXCLUDED_STEMS, TOOLING_EXCLUDED_EXTS, TOOLING_EXCLUDED_STEMS,
};

/// Decides whether the crawler may descend into a directory.
///
/// Only directories are judged; files are always recorded.
pub trait NamePolicy: Send + Sync {
    fn is_valid_stem(&self, stem: &str) -> bool;
    fn is_valid_ext(&self, ext: &str) -> bool;

    #[inline]
    fn admits(&self, stem: &str, ext: &str) -> bool {
        self.is_valid_stem(stem) && self.is_valid_ext(ext)
    }
}

/// Descends into every directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl NamePolicy for AcceptAll {
    #[inline]
    fn is_valid_stem(&self, _stem: &str) -> bool {
        true
    }

    #[inline]
    fn is_valid_ext(&self, _ext: &str) -> bool {
        true
    }
}

/// Directory names a policy refuses to descend into.
/// Extensions carry their leading dot; matching is exact and case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclusions {
    stems: Vec<String>,
    exts: Vec<String>,
}

impl Exclusions {
    pub fn new(stems: Vec<String>, exts: Vec<String>) -> Self {
        Self { stems, exts }
    }

    pub fn from_static(stems: &[&str], exts: &[&str]) -> Self {
        Self {
            stems: stems.iter().map(|s| (*s).to_owned()).collect(),
            exts: exts.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    /// Build-system scratch directories and VCS/cache extensions.
    pub fn normal() -> Self {
        Self::from_static(NORMAL_EXCLUDED_STEMS, NORMAL_EXCLUDED_EXTS)
    }

    /// Generated documentation and tool sandboxes.
    pub fn tooling() -> Self {
        Self::from_static(TOOLING_EXCLUDED_STEMS, TOOLING_EXCLUDED_EXTS)
    }

    pub fn stems(&self) -> &[String] {
        &self.stems
    }

    pub fn exts(&self) -> &[String] {
        &self.exts
    }
}

#[derive(Debug, Clone)]
pub struct ExclusionPolicy {
    exclusions: Exclusions,
}

impl ExclusionPolicy {
    pub fn new(exclusions: Exclusions) -> Self {
        Self { exclusions }
    }

    pub fn exclusions(&self) -> &Exclusions {
        &self.exclusions
    }
}

impl NamePolicy for ExclusionPolicy {
    fn is_valid_stem(&self, stem: &str) -> bool {
        !self.exclusions.stems.iter().any(|s| s == stem)
    }

    fn is_valid_ext(&self, ext: &str) -> bool {
        !self.exclusions.exts.iter().any(|e| e == ext)
    }
}

/// The standard policies, selectable by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    All,
    #[default]
    Normal,
    Tooling,
}

impl PolicyKind {
    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::All => "all",
            PolicyKind::Normal => "normal",
            PolicyKind::Tooling => "tooling",
        }
    }

    pub fn build(self) -> Box<dyn NamePolicy> {
        match self {
            PolicyKind::All => Box::new(AcceptAll),
            PolicyKind::Normal => Box::new(ExclusionPolicy::new(Exclusions::normal())),
            PolicyKind::Tooling => Box::new(ExclusionPolicy::new(Exclusions::tooling())),
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" | "accept-all" => Ok(PolicyKind::All),
            "normal" => Ok(PolicyKind::Normal),
            "tooling" | "tool" => Ok(PolicyKind::Tooling),
            other => Err(format!(
                "unknown name policy '{other}' (expected all, normal or tooling)"
            )),
        }
    }
}

#[cfg(test)]
#[path = "policy_tests.rs"]
mod tests;
