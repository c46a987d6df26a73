//! Element exclusion rules.
//!
//! Ignored elements never contribute to the verdict. Names can be excluded
//! literally or, in regex mode, by a case-insensitive pattern search.

use std::collections::HashSet;

use regex::{Regex, RegexBuilder};

use crate::error::{ProbeError, Result};

/// Elements whose status is wrong on OperationalStatus firmware.
pub const FIRMWARE_QUIRKS: &[&str] = &[
    "System Board 1 Riser Config Err 0: Connected",
    "Add-in Card 4 PEM Presence 0: Connected",
];

/// Front panel and display cable sensors, skipped with `--no-lcd`.
pub const LCD_ELEMENTS: &[&str] = &[
    "System Board 1 LCD Cable Pres 0: Connected",
    "System Board 1 VGA Cable Pres 0: Connected",
    "Front Panel Board 1 FP LCD Cable 0: Connected",
    "Front Panel Board 1 FP LCD Cable 0: Config Error",
];

/// Chassis intrusion sensors, skipped with `--no-intrusion`.
pub const INTRUSION_ELEMENTS: &[&str] = &[
    "System Chassis 1 Chassis Intru: General Chassis intrusion",
    "System Chassis 1 Chassis Intru: Drive Bay intrusion",
    "System Chassis 1 Chassis Intru: I/O Card area intrusion",
    "System Chassis 1 Chassis Intru: Processor area intrusion",
    "System Chassis 1 Chassis Intru: System unplugged from LAN",
    "System Chassis 1 Chassis Intru: Unauthorized dock",
    "System Chassis 1 Chassis Intru: FAN area intrusion",
    "System Chassis 1 Chassis Intru: Unknown",
];

/// Exact and pattern-based exclusion of element names.
#[derive(Debug, Default)]
pub struct IgnoreRules {
    exact: HashSet<String>,
    patterns: Vec<Regex>,
    /// Whether entries are also searched as patterns.
    search: bool,
    /// Names already matched by a pattern in this run.
    matched: HashSet<String>,
}

impl IgnoreRules {
    /// Build rules from the user's list. With `regex` set, every entry is
    /// also compiled as a case-insensitive pattern. Empty entries are
    /// dropped so that `-i ''` does not match everything in regex mode.
    pub fn new<S: AsRef<str>>(entries: &[S], regex: bool) -> Result<Self> {
        let mut rules = Self {
            search: regex,
            ..Self::default()
        };
        for entry in entries {
            rules.add(entry.as_ref())?;
        }
        Ok(rules)
    }

    /// Add more names under the same matching mode as the user's entries.
    pub fn extend<'n, I>(&mut self, names: I) -> Result<()>
    where
        I: IntoIterator<Item = &'n str>,
    {
        for name in names {
            self.add(name)?;
        }
        Ok(())
    }

    fn add(&mut self, entry: &str) -> Result<()> {
        if entry.is_empty() {
            return Ok(());
        }
        self.exact.insert(entry.to_string());

        if self.search {
            let pattern = RegexBuilder::new(entry)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    ProbeError::config(format!("invalid ignore pattern '{}': {}", entry, e))
                })?;
            self.patterns.push(pattern);
        }
        Ok(())
    }

    pub fn is_regex(&self) -> bool {
        !self.patterns.is_empty()
    }

    /// Decide whether `name` is excluded, remembering pattern hits so that
    /// repeated elements are excluded without searching again.
    pub fn is_ignored(&mut self, name: &str) -> bool {
        if self.exact.contains(name) || self.matched.contains(name) {
            return true;
        }

        if self.patterns.iter().any(|p| p.is_match(name)) {
            log::debug!("    (ignored through regex)");
            self.matched.insert(name.to_string());
            return true;
        }

        false
    }
}
