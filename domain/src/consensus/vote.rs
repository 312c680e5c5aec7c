//! Opinions and weighted tallies

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One tool's value for one aspect, with its voting weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opinion {
    pub tool_id: String,
    pub value: Value,
    /// Voting weight (registry quality ÷ 100)
    pub weight: f64,
}

impl Opinion {
    pub fn new(tool_id: impl Into<String>, value: Value, weight: f64) -> Self {
        Self {
            tool_id: tool_id.into(),
            value,
            weight: weight.max(0.0),
        }
    }

    /// Canonical serialized form used to compare values
    pub fn key(&self) -> String {
        self.value.to_string()
    }
}

/// Support for one distinct value
#[derive(Debug, Clone, PartialEq)]
pub struct TallyEntry {
    pub value: Value,
    pub supporters: Vec<String>,
    pub weight: f64,
}

/// Opinions grouped by distinct value, in order of first appearance
#[derive(Debug, Clone, Default)]
pub struct VoteTally {
    entries: Vec<(String, TallyEntry)>,
    total_weight: f64,
    total_votes: usize,
}

impl VoteTally {
    pub fn from_opinions(opinions: &[Opinion]) -> Self {
        let mut tally = VoteTally::default();
        for opinion in opinions {
            let key = opinion.key();
            tally.total_weight += opinion.weight;
            tally.total_votes += 1;
            match tally.entries.iter_mut().find(|(k, _)| *k == key) {
                Some((_, entry)) => {
                    entry.supporters.push(opinion.tool_id.clone());
                    entry.weight += opinion.weight;
                }
                None => tally.entries.push((
                    key,
                    TallyEntry {
                        value: opinion.value.clone(),
                        supporters: vec![opinion.tool_id.clone()],
                        weight: opinion.weight,
                    },
                )),
            }
        }
        tally
    }

    /// Number of distinct values
    pub fn distinct(&self) -> usize {
        self.entries.len()
    }

    pub fn total_votes(&self) -> usize {
        self.total_votes
    }

    /// Whether every opinion carries the same value
    pub fn is_unanimous(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Entry with the highest summed weight (earliest wins ties)
    pub fn weighted_winner(&self) -> Option<&TallyEntry> {
        let mut best: Option<&TallyEntry> = None;
        for (_, entry) in &self.entries {
            if best.is_none_or(|b| entry.weight > b.weight) {
                best = Some(entry);
            }
        }
        best
    }

    /// Entry with the most supporters (earliest wins ties)
    pub fn count_leader(&self) -> Option<&TallyEntry> {
        let mut best: Option<&TallyEntry> = None;
        for (_, entry) in &self.entries {
            if best.is_none_or(|b| entry.supporters.len() > b.supporters.len()) {
                best = Some(entry);
            }
        }
        best
    }

    /// Share of the total weight held by `entry` (0.0 when no weight)
    pub fn weight_share(&self, entry: &TallyEntry) -> f64 {
        if self.total_weight <= 0.0 {
            0.0
        } else {
            entry.weight / self.total_weight
        }
    }

    /// `entry` is backed by strictly more than half of the contributors
    pub fn is_strict_majority(&self, entry: &TallyEntry) -> bool {
        entry.supporters.len() * 2 > self.total_votes()
    }

    /// Compact summary, e.g. `"high"×2 "low"×1`
    pub fn summary(&self) -> String {
        self.entries
            .iter()
            .map(|(key, entry)| format!("{}×{}", key, entry.supporters.len()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn opinions() -> Vec<Opinion> {
        vec![
            Opinion::new("a", json!("high"), 0.5),
            Opinion::new("b", json!("high"), 0.5),
            Opinion::new("c", json!("low"), 0.9),
        ]
    }

    #[test]
    fn test_tally_groups_values() {
        let tally = VoteTally::from_opinions(&opinions());
        assert_eq!(tally.distinct(), 2);
        assert_eq!(tally.total_votes(), 3);
        assert!(!tally.is_unanimous());
        assert_eq!(tally.summary(), "\"high\"×2 \"low\"×1");
    }

    #[test]
    fn test_weighted_winner() {
        let tally = VoteTally::from_opinions(&opinions());
        let winner = tally.weighted_winner().unwrap();
        assert_eq!(winner.value, json!("high"));
        assert!((winner.weight - 1.0).abs() < 1e-9);
        assert!((tally.weight_share(winner) - 1.0 / 1.9).abs() < 1e-9);
    }

    #[test]
    fn test_count_leader_tie_keeps_first() {
        let tally = VoteTally::from_opinions(&[
            Opinion::new("a", json!(1), 0.1),
            Opinion::new("b", json!(2), 0.9),
        ]);
        assert_eq!(tally.count_leader().unwrap().value, json!(1));
        assert_eq!(tally.weighted_winner().unwrap().value, json!(2));
    }

    #[test]
    fn test_strict_majority() {
        let tally = VoteTally::from_opinions(&opinions());
        let leader = tally.count_leader().unwrap();
        assert!(tally.is_strict_majority(leader));

        // two against two is a tie, not a majority
        let split = VoteTally::from_opinions(&[
            Opinion::new("a", json!(1), 0.5),
            Opinion::new("b", json!(1), 0.5),
            Opinion::new("c", json!(2), 0.5),
            Opinion::new("d", json!(2), 0.5),
        ]);
        assert!(!split.is_strict_majority(split.count_leader().unwrap()));
    }

    #[test]
    fn test_negative_weight_clamped() {
        assert_eq!(Opinion::new("a", json!(1), -3.0).weight, 0.0);
    }
}
