//! Deterministic performance-data rendering.
//!
//! CIM gives no ordering guarantee, so entries are ordered by content only:
//! first by rendered string to number each category, then by
//! category, number and the final tagged string.

use crate::core::sensor::{SensorCategory, SensorReading};

/// A reading after numbering, e.g. `P4Tem_0_Ambient=25;0;0 `.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerfEntry {
    pub category: SensorCategory,
    pub sequence: usize,
    pub rendered: String,
}

impl PerfEntry {
    fn sort_key(&self) -> (SensorCategory, usize, &str) {
        (self.category, self.sequence, &self.rendered)
    }
}

/// Number and order readings independently of their input order.
pub fn order(readings: &[SensorReading]) -> Vec<PerfEntry> {
    let mut plain: Vec<(String, SensorCategory)> = readings
        .iter()
        .map(|r| (r.render(), r.category))
        .collect();
    plain.sort();

    let mut counters = [0usize; 7];
    let mut entries: Vec<PerfEntry> = plain
        .into_iter()
        .map(|(text, category)| {
            let slot = &mut counters[category.ordinal() as usize];
            let sequence = *slot;
            *slot += 1;
            PerfEntry {
                category,
                sequence,
                rendered: format!(
                    "P{}{}_{}_{}",
                    category.ordinal(),
                    category.prefix(),
                    sequence,
                    text
                ),
            }
        })
        .collect();

    entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    entries
}

/// `|` followed by every ordered entry, or an empty string when there is
/// nothing to report.
pub fn render(readings: &[SensorReading]) -> String {
    let entries = order(readings);
    if entries.is_empty() {
        return String::new();
    }

    let mut perf = String::from("|");
    for entry in &entries {
        perf.push_str(&entry.rendered);
    }
    perf
}
