use std::collections::BTreeSet;

use super::super::domain::{
    clamp_unit, AffinitySignals, Candidate, Mandate, Source, SourceProfile, TagRequirement,
};
use super::super::normalizer::normalize_tags;
use super::config::AffinityWeights;

/// Score assigned when a source carries no signal for a dimension.
pub(crate) const NEUTRAL_SIGNAL: f64 = 0.5;

pub(crate) fn score_source(
    source: &Source,
    candidate: &Candidate,
    mandate: &Mandate,
    affinity_weights: &AffinityWeights,
    reliability: f64,
) -> SourceProfile {
    SourceProfile {
        source_id: source.id.clone(),
        source_type: source.source_type,
        expertise_score: expertise_score(&source.asserted_tags, candidate, mandate),
        similarity_score: similarity_score(source.affinity.as_ref(), affinity_weights),
        reliability_score: clamp_unit(reliability),
    }
}

/// Candidate tags that the mandate asks for, either as primary or adjacent values.
fn mandate_relevant_tags(candidate: &Candidate, mandate: &Mandate) -> BTreeSet<String> {
    let dimensions: [(&BTreeSet<String>, &TagRequirement); 4] = [
        (&candidate.sectors, &mandate.sector),
        (&candidate.functions, &mandate.function),
        (&candidate.asset_classes, &mandate.asset_class),
        (&candidate.geographies, &mandate.geography),
    ];

    let mut relevant = BTreeSet::new();
    for (tags, requirement) in dimensions {
        let wanted: BTreeSet<String> = normalize_tags(&requirement.required)
            .into_iter()
            .chain(normalize_tags(&requirement.related))
            .collect();
        relevant.extend(normalize_tags(tags).intersection(&wanted).cloned());
    }
    relevant
}

fn expertise_score(asserted: &BTreeSet<String>, candidate: &Candidate, mandate: &Mandate) -> f64 {
    let asserted = normalize_tags(asserted);
    if asserted.is_empty() {
        return NEUTRAL_SIGNAL;
    }

    let relevant = mandate_relevant_tags(candidate, mandate);
    if relevant.is_empty() {
        return 0.0;
    }

    let evidenced = asserted.intersection(&relevant).count();
    clamp_unit(evidenced as f64 / relevant.len() as f64)
}

/// Noisy-OR over affinity components; reads no domain tags so it stays independent of expertise.
fn similarity_score(affinity: Option<&AffinitySignals>, weights: &AffinityWeights) -> f64 {
    let Some(affinity) = affinity else {
        return NEUTRAL_SIGNAL;
    };

    let components = [
        component(affinity.shared_employers, weights.shared_employer),
        component(
            affinity.shared_network_connections,
            weights.shared_network_connection,
        ),
        component(affinity.shared_institutions, weights.shared_institution),
    ];

    let absent = components
        .iter()
        .fold(1.0, |remaining, value| remaining * (1.0 - value));
    clamp_unit(1.0 - absent)
}

fn component(count: u32, weight: f64) -> f64 {
    clamp_unit(count as f64 * weight)
}
