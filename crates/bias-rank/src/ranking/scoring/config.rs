use serde::{Deserialize, Serialize};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Fit-scorer weights per dimension, as fractions of 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionWeights {
    pub sector: f64,
    pub function: f64,
    pub asset_class: f64,
    pub geography: f64,
    pub seniority: f64,
}

impl DimensionWeights {
    /// Builds weights from whole percentages (40, 25, 15, 10, 10).
    pub fn from_percentages(
        sector: f64,
        function: f64,
        asset_class: f64,
        geography: f64,
        seniority: f64,
    ) -> Self {
        Self {
            sector: sector / 100.0,
            function: function / 100.0,
            asset_class: asset_class / 100.0,
            geography: geography / 100.0,
            seniority: seniority / 100.0,
        }
    }

    pub fn sum(&self) -> f64 {
        self.sector + self.function + self.asset_class + self.geography + self.seniority
    }

    fn named(&self) -> [(&'static str, f64); 5] {
        [
            ("sector", self.sector),
            ("function", self.function),
            ("asset_class", self.asset_class),
            ("geography", self.geography),
            ("seniority", self.seniority),
        ]
    }
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self::from_percentages(40.0, 25.0, 15.0, 10.0, 10.0)
    }
}

/// Weights blending fit, expertise, capped similarity and reliability into the composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeWeights {
    pub base_match: f64,
    pub expertise: f64,
    pub similarity: f64,
    pub reliability: f64,
}

impl CompositeWeights {
    pub fn sum(&self) -> f64 {
        self.base_match + self.expertise + self.similarity + self.reliability
    }

    fn named(&self) -> [(&'static str, f64); 4] {
        [
            ("base_match", self.base_match),
            ("expertise", self.expertise),
            ("similarity", self.similarity),
            ("reliability", self.reliability),
        ]
    }
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            base_match: 0.4,
            expertise: 0.4,
            similarity: 0.1,
            reliability: 0.1,
        }
    }
}

/// Contribution of a single occurrence of each affinity signal, saturating at 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffinityWeights {
    pub shared_employer: f64,
    pub shared_network_connection: f64,
    pub shared_institution: f64,
}

impl AffinityWeights {
    fn named(&self) -> [(&'static str, f64); 3] {
        [
            ("shared_employer", self.shared_employer),
            ("shared_network_connection", self.shared_network_connection),
            ("shared_institution", self.shared_institution),
        ]
    }
}

impl Default for AffinityWeights {
    fn default() -> Self {
        Self {
            shared_employer: 0.4,
            shared_network_connection: 0.15,
            shared_institution: 0.3,
        }
    }
}

/// Policy dials for the scoring engine. Must pass [`ScoringConfig::validate`] before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    pub dimension_weights: DimensionWeights,
    pub composite_weights: CompositeWeights,
    pub affinity_weights: AffinityWeights,
    /// How far average similarity may exceed average expertise before it is capped.
    pub similarity_cap_margin: f64,
    /// Pseudo-observation count pulling reliability toward `prior_mean`.
    pub shrinkage_strength: f64,
    pub prior_mean: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            dimension_weights: DimensionWeights::default(),
            composite_weights: CompositeWeights::default(),
            affinity_weights: AffinityWeights::default(),
            similarity_cap_margin: 0.15,
            shrinkage_strength: 5.0,
            prior_mean: 0.5,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        for (name, value) in self.dimension_weights.named() {
            check_weight(name, value)?;
        }
        let sum = self.dimension_weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoringConfigError::DimensionWeightsSum { sum });
        }

        for (name, value) in self.composite_weights.named() {
            check_weight(name, value)?;
        }
        let sum = self.composite_weights.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoringConfigError::CompositeWeightsSum { sum });
        }

        for (name, value) in self.affinity_weights.named() {
            check_weight(name, value)?;
        }

        if !self.similarity_cap_margin.is_finite()
            || !(0.0..=1.0).contains(&self.similarity_cap_margin)
        {
            return Err(ScoringConfigError::CapMargin(self.similarity_cap_margin));
        }
        if !self.shrinkage_strength.is_finite() || self.shrinkage_strength < 0.0 {
            return Err(ScoringConfigError::ShrinkageStrength(
                self.shrinkage_strength,
            ));
        }
        if !self.prior_mean.is_finite() || !(0.0..=1.0).contains(&self.prior_mean) {
            return Err(ScoringConfigError::PriorMean(self.prior_mean));
        }

        Ok(())
    }
}

fn check_weight(name: &'static str, value: f64) -> Result<(), ScoringConfigError> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ScoringConfigError::InvalidWeight { name, value })
    }
}

/// Rejected scoring configuration. Raised at load time, before any scoring call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("dimension weights must sum to 1.0 (found {sum:.4})")]
    DimensionWeightsSum { sum: f64 },
    #[error("composite weights must sum to 1.0 (found {sum:.4})")]
    CompositeWeightsSum { sum: f64 },
    #[error("weight '{name}' must be a finite value in [0, 1] (found {value})")]
    InvalidWeight { name: &'static str, value: f64 },
    #[error("similarity cap margin must be within [0, 1] (found {0})")]
    CapMargin(f64),
    #[error("shrinkage strength must be a finite, non-negative value (found {0})")]
    ShrinkageStrength(f64),
    #[error("reliability prior mean must be within [0, 1] (found {0})")]
    PriorMean(f64),
}
