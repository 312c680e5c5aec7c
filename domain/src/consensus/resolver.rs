//! Consensus resolver: reconciles overlapping tool outputs

use super::expertise::ExpertTable;
use super::result::{Conflict, ConsensusResult, ResolutionMethod};
use super::vote::{Opinion, VoteTally};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Number of contributors at which the contributor bonus saturates
const FULL_CONTRIBUTOR_COUNT: f64 = 5.0;
const AGREEMENT_WEIGHT: f64 = 0.7;
const CONTRIBUTOR_WEIGHT: f64 = 0.3;

/// Tunables for conflict resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverSettings {
    /// Share of total weight the weighted winner needs to count as decisive
    pub decisive_share: f64,
    /// Quality score assumed for tools missing from the registry (0-100)
    pub default_quality: f64,
    pub experts: ExpertTable,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            decisive_share: 0.7,
            default_quality: 50.0,
            experts: ExpertTable::default(),
        }
    }
}

/// Reconciles the outputs of several tools into one value per aspect.
///
/// Pure computation: all inputs are passed in, nothing is awaited.
///
/// # Example
///
/// ```
/// use conductor_domain::consensus::{ConsensusResolver, ResolutionMethod};
/// use serde_json::json;
///
/// let resolver = ConsensusResolver::default();
/// let results = vec![
///     ("a".to_string(), json!({"severity": "high"})),
///     ("b".to_string(), json!({"severity": "high"})),
///     ("c".to_string(), json!({"severity": "low"})),
/// ];
///
/// let consensus = resolver.resolve(&results, |_| None);
/// assert_eq!(consensus.resolved["severity"], json!("high"));
/// assert_eq!(consensus.conflicts[0].resolution, ResolutionMethod::Majority);
/// assert!(consensus.agreement < 1.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConsensusResolver {
    settings: ResolverSettings,
}

impl ConsensusResolver {
    pub fn new(settings: ResolverSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolve `results` (tool id, output) into a [`ConsensusResult`].
    ///
    /// `quality_of` returns a tool's registry quality score (0-100), if known.
    /// Only top-level fields of object outputs count as aspects.
    pub fn resolve<F>(&self, results: &[(String, Value)], quality_of: F) -> ConsensusResult
    where
        F: Fn(&str) -> Option<f64>,
    {
        let aspects: BTreeSet<&str> = results
            .iter()
            .filter_map(|(_, value)| value.as_object())
            .flat_map(|object| object.keys().map(|k| k.as_str()))
            .collect();

        let mut conflicts = Vec::new();
        let mut resolved = BTreeMap::new();

        for aspect in &aspects {
            let opinions: Vec<Opinion> = results
                .iter()
                .filter_map(|(tool_id, value)| {
                    let opinion = value.as_object()?.get(*aspect)?;
                    let quality = quality_of(tool_id).unwrap_or(self.settings.default_quality);
                    Some(Opinion::new(tool_id, opinion.clone(), quality / 100.0))
                })
                .collect();

            let tally = VoteTally::from_opinions(&opinions);
            if tally.is_unanimous() {
                if let Some(first) = opinions.first() {
                    resolved.insert(aspect.to_string(), first.value.clone());
                }
                continue;
            }

            let (value, method) = self.settle(aspect, &opinions, &tally);
            resolved.insert(aspect.to_string(), value.clone());
            conflicts.push(Conflict {
                aspect: aspect.to_string(),
                opinions: opinions
                    .iter()
                    .map(|o| (o.tool_id.clone(), o.value.clone()))
                    .collect(),
                resolution: method,
                resolved: value,
            });
        }

        let total = aspects.len();
        let agreement = if total == 0 {
            1.0
        } else {
            (total - conflicts.len()) as f64 / total as f64
        };
        let contributor_factor = (results.len() as f64 / FULL_CONTRIBUTOR_COUNT).min(1.0);
        let confidence =
            (AGREEMENT_WEIGHT * agreement + CONTRIBUTOR_WEIGHT * contributor_factor).clamp(0.0, 1.0);

        ConsensusResult {
            agreement,
            conflicts,
            resolved,
            confidence,
            contributors: results.iter().map(|(id, _)| id.clone()).collect(),
        }
    }

    /// Pick a value for a disagreeing aspect and report how it was chosen
    fn settle(&self, aspect: &str, opinions: &[Opinion], tally: &VoteTally) -> (Value, ResolutionMethod) {
        if let Some(expert) = self.settings.experts.expert_for(aspect)
            && let Some(opinion) = opinions.iter().find(|o| o.tool_id == expert)
        {
            return (opinion.value.clone(), ResolutionMethod::Expert);
        }

        let weighted = tally.weighted_winner();
        if let Some(winner) = weighted
            && tally.weight_share(winner) >= self.settings.decisive_share
        {
            return (winner.value.clone(), ResolutionMethod::WeightedVote);
        }

        if let Some(leader) = tally.count_leader()
            && tally.is_strict_majority(leader)
        {
            return (leader.value.clone(), ResolutionMethod::Majority);
        }

        let value = weighted.map(|w| w.value.clone()).unwrap_or(Value::Null);
        (value, ResolutionMethod::WeightedFallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn results(items: &[(&str, Value)]) -> Vec<(String, Value)> {
        items
            .iter()
            .map(|(id, v)| (id.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_full_agreement() {
        let resolver = ConsensusResolver::default();
        let consensus = resolver.resolve(
            &results(&[
                ("a", json!({"severity": "high", "count": 2})),
                ("b", json!({"severity": "high"})),
            ]),
            |_| None,
        );

        assert_eq!(consensus.agreement, 1.0);
        assert!(consensus.conflicts.is_empty());
        assert_eq!(consensus.resolved["count"], json!(2));
        // 0.7 * 1.0 + 0.3 * (2 / 5)
        assert!((consensus.confidence - 0.82).abs() < 1e-9);
    }

    #[test]
    fn test_majority_resolution() {
        let resolver = ConsensusResolver::default();
        let consensus = resolver.resolve(
            &results(&[
                ("a", json!({"severity": "high"})),
                ("b", json!({"severity": "high"})),
                ("c", json!({"severity": "low"})),
            ]),
            |_| Some(80.0),
        );

        assert_eq!(consensus.conflicts.len(), 1);
        let conflict = consensus.conflict_for("severity").unwrap();
        assert_eq!(conflict.resolution, ResolutionMethod::Majority);
        assert_eq!(conflict.resolved, json!("high"));
        assert_eq!(conflict.opinions.len(), 3);
        assert_eq!(consensus.agreement, 0.0);
    }

    #[test]
    fn test_expert_wins() {
        let resolver = ConsensusResolver::default();
        let consensus = resolver.resolve(
            &results(&[
                ("quality-checker", json!({"security": "clean"})),
                ("test-analyzer", json!({"security": "clean"})),
                ("security-auditor", json!({"security": "vulnerable"})),
            ]),
            |_| None,
        );

        let conflict = consensus.conflict_for("security").unwrap();
        assert_eq!(conflict.resolution, ResolutionMethod::Expert);
        assert_eq!(consensus.resolved["security"], json!("vulnerable"));
    }

    #[test]
    fn test_decisive_weighted_vote() {
        let resolver = ConsensusResolver::default();
        let consensus = resolver.resolve(
            &results(&[
                ("strong", json!({"verdict": "pass"})),
                ("weak-1", json!({"verdict": "fail"})),
                ("weak-2", json!({"verdict": "fail"})),
            ]),
            |id| Some(if id == "strong" { 100.0 } else { 10.0 }),
        );

        let conflict = consensus.conflict_for("verdict").unwrap();
        assert_eq!(conflict.resolution, ResolutionMethod::WeightedVote);
        assert_eq!(conflict.resolved, json!("pass"));
    }

    #[test]
    fn test_weighted_fallback_on_split() {
        let resolver = ConsensusResolver::default();
        let consensus = resolver.resolve(
            &results(&[
                ("a", json!({"verdict": "pass"})),
                ("b", json!({"verdict": "fail"})),
            ]),
            |id| Some(if id == "b" { 60.0 } else { 40.0 }),
        );

        let conflict = consensus.conflict_for("verdict").unwrap();
        assert_eq!(conflict.resolution, ResolutionMethod::WeightedFallback);
        assert_eq!(conflict.resolved, json!("fail"));
    }

    #[test]
    fn test_partial_agreement_ratio() {
        let resolver = ConsensusResolver::default();
        let consensus = resolver.resolve(
            &results(&[
                ("a", json!({"x": 1, "y": "same"})),
                ("b", json!({"x": 2, "y": "same"})),
                ("c", json!({"x": 1})),
            ]),
            |_| None,
        );

        assert_eq!(consensus.agreement, 0.5);
        assert!(consensus.has_conflicts());
        assert_eq!(consensus.contributors, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_non_object_outputs_have_no_aspects() {
        let resolver = ConsensusResolver::default();
        let consensus = resolver.resolve(&results(&[("a", json!("text")), ("b", json!(3))]), |_| None);

        assert_eq!(consensus.agreement, 1.0);
        assert!(consensus.resolved.is_empty());
    }
}
