//! Similarity suggestions for invalid resource/operation values.
//!
//! Pure lookup over the capability vocabulary: ranks candidates by lexical
//! similarity plus structural plausibility and returns confidence-scored
//! corrections. Failures degrade to an empty list so validation is never
//! blocked by the suggestion path.

mod scoring;

pub use scoring::{levenshtein_distance, similarity};

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::capability::CapabilityProvider;

/// A ranked candidate correction.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub value: String,
    /// Confidence in [0,1].
    pub confidence: f64,
    pub reason: String,
}

/// Candidates scoring below this are never returned.
const MIN_CONFIDENCE: f64 = 0.3;
/// Penalty applied to operations that are only valid for another resource.
const CROSS_RESOURCE_PENALTY: f64 = 0.8;

/// Lowercased vocabulary of one node type, memoized per service instance.
struct VocabularyIndex {
    resources: Vec<(String, String)>,
    operations_by_resource: HashMap<String, Vec<(String, String)>>,
}

/// Suggestion service over a capability provider.
pub struct SuggestionService<'a> {
    provider: &'a dyn CapabilityProvider,
    index_cache: RwLock<HashMap<String, Arc<VocabularyIndex>>>,
}

impl<'a> SuggestionService<'a> {
    pub fn new(provider: &'a dyn CapabilityProvider) -> Self {
        Self {
            provider,
            index_cache: RwLock::new(HashMap::new()),
        }
    }

    /// Ranked corrections for an invalid resource value.
    pub fn suggest_resource(
        &self,
        node_type: &str,
        invalid: &str,
        limit: usize,
    ) -> Vec<Suggestion> {
        let Some(index) = self.index_for(node_type) else {
            return Vec::new();
        };

        let mut suggestions: Vec<Suggestion> = index
            .resources
            .iter()
            .filter_map(|(original, lowered)| score_candidate(invalid, original, lowered))
            .collect();

        rank(&mut suggestions, limit);
        suggestions
    }

    /// Ranked corrections for an invalid operation value.
    ///
    /// With a resource context, candidates valid for that resource rank
    /// first; operations belonging to other resources are still offered,
    /// penalized and annotated with the resource they belong to.
    pub fn suggest_operation(
        &self,
        node_type: &str,
        invalid: &str,
        resource: Option<&str>,
        limit: usize,
    ) -> Vec<Suggestion> {
        let Some(index) = self.index_for(node_type) else {
            return Vec::new();
        };

        let mut suggestions: Vec<Suggestion> = Vec::new();

        for (owner, operations) in &index.operations_by_resource {
            let in_context = match resource {
                Some(context) => owner == context,
                None => true,
            };
            for (original, lowered) in operations {
                let Some(mut suggestion) = score_candidate(invalid, original, lowered) else {
                    continue;
                };
                if !in_context {
                    suggestion.confidence *= CROSS_RESOURCE_PENALTY;
                    suggestion.reason =
                        format!("{} (valid for resource '{}')", suggestion.reason, owner);
                }
                suggestions.push(suggestion);
            }
        }

        // The same operation name can appear under several resources; keep
        // the best-scoring occurrence.
        suggestions.sort_by(|a, b| a.value.cmp(&b.value));
        suggestions.dedup_by(|next, kept| {
            if next.value != kept.value {
                return false;
            }
            if next.confidence > kept.confidence {
                std::mem::swap(next, kept);
            }
            true
        });

        rank(&mut suggestions, limit);
        suggestions
    }

    fn index_for(&self, node_type: &str) -> Option<Arc<VocabularyIndex>> {
        if let Some(index) = self.index_cache.read().get(node_type) {
            return Some(Arc::clone(index));
        }

        let descriptor = self.provider.get(node_type)?;
        if descriptor.known_resources.is_empty() && descriptor.operations_by_resource.is_empty() {
            return None;
        }

        let index = Arc::new(VocabularyIndex {
            resources: descriptor
                .known_resources
                .iter()
                .map(|r| (r.clone(), r.to_lowercase()))
                .collect(),
            operations_by_resource: descriptor
                .operations_by_resource
                .iter()
                .map(|(resource, ops)| {
                    (
                        resource.clone(),
                        ops.iter().map(|o| (o.clone(), o.to_lowercase())).collect(),
                    )
                })
                .collect(),
        });

        self.index_cache
            .write()
            .insert(node_type.to_string(), Arc::clone(&index));
        Some(index)
    }
}

/// Score one candidate against the invalid value.
fn score_candidate(invalid: &str, original: &str, lowered: &str) -> Option<Suggestion> {
    let invalid_lowered = invalid.to_lowercase();

    if invalid_lowered == *lowered {
        return Some(Suggestion {
            value: original.to_string(),
            confidence: 1.0,
            reason: format!("matches '{}' ignoring case", invalid),
        });
    }

    let base = similarity(&invalid_lowered, lowered);
    let (confidence, reason) = if lowered.starts_with(&invalid_lowered)
        || invalid_lowered.starts_with(lowered)
    {
        (
            base.max(0.85),
            format!("shares a prefix with '{}'", invalid),
        )
    } else if lowered.contains(&invalid_lowered) || invalid_lowered.contains(lowered) {
        (base.max(0.75), format!("contains '{}'", invalid))
    } else {
        (base, format!("similar spelling to '{}'", invalid))
    };

    if confidence < MIN_CONFIDENCE {
        return None;
    }

    Some(Suggestion {
        value: original.to_string(),
        confidence,
        reason,
    })
}

/// Sort by confidence descending (value name as tie-break) and truncate.
fn rank(suggestions: &mut Vec<Suggestion>, limit: usize) {
    suggestions.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.value.cmp(&b.value))
    });
    suggestions.truncate(limit);
}
