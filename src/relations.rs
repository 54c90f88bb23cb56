//! Directed diplomatic-affinity graph between countries.
//!
//! Weights run roughly from 0.1 (cold) to 1.5 (close allies). A donor's
//! willingness to send relief to a recipient is `exp(-weight)`, with a missing
//! edge treated as a neutral weight of 1.0.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};

pub const DEFAULT_WEIGHT: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelationsNoise {
    #[serde(default = "default_noise_enabled")]
    pub enabled: bool,
    #[serde(default = "default_noise_probability")]
    pub probability: f64,
    #[serde(default = "default_noise_decrement")]
    pub decrement: f64,
}

fn default_noise_enabled() -> bool {
    true
}

fn default_noise_probability() -> f64 {
    0.5
}

fn default_noise_decrement() -> f64 {
    0.1
}

impl RelationsNoise {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.probability) {
            return Err(GenerationError::InvalidConfig(format!(
                "relations_noise.probability {} must lie in [0, 1]",
                self.probability
            )));
        }
        if !self.decrement.is_finite() {
            return Err(GenerationError::InvalidConfig(format!(
                "relations_noise.decrement {} must be finite",
                self.decrement
            )));
        }
        Ok(())
    }
}

impl Default for RelationsNoise {
    fn default() -> Self {
        Self {
            enabled: default_noise_enabled(),
            probability: default_noise_probability(),
            decrement: default_noise_decrement(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationsGraph {
    edges: BTreeMap<String, BTreeMap<String, f64>>,
}

impl RelationsGraph {
    pub fn empty() -> Self {
        Self {
            edges: BTreeMap::new(),
        }
    }

    pub fn with_edge(mut self, donor: &str, recipient: &str, weight: f64) -> Self {
        self.set_weight(donor, recipient, weight);
        self
    }

    pub fn set_weight(&mut self, donor: &str, recipient: &str, weight: f64) {
        self.edges
            .entry(donor.to_string())
            .or_default()
            .insert(recipient.to_string(), weight);
    }

    pub fn weight(&self, donor: &str, recipient: &str) -> Option<f64> {
        self.edges.get(donor).and_then(|row| row.get(recipient)).copied()
    }

    pub fn relation_score(&self, donor: &str, recipient: &str) -> f64 {
        let weight = self.weight(donor, recipient).unwrap_or(DEFAULT_WEIGHT);
        (-weight).exp()
    }

    /// Weights must be finite and non-negative so every score lies in (0, 1].
    pub fn validate(&self) -> Result<()> {
        for (donor, row) in &self.edges {
            for (recipient, weight) in row {
                if !weight.is_finite() || *weight < 0.0 {
                    return Err(GenerationError::InvalidConfig(format!(
                        "relation weight {donor} -> {recipient} is {weight}, expected a finite value >= 0"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Every country with at least one outgoing edge, in sorted order.
    pub fn donors(&self) -> Vec<&str> {
        self.edges.keys().map(String::as_str).collect()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum()
    }

    /// Flips an independent coin per edge and weakens the tie on success.
    /// Edges are visited in sorted order so a seeded rng gives a stable result.
    pub fn perturb<R: Rng + ?Sized>(&mut self, rng: &mut R, noise: &RelationsNoise) -> usize {
        if !noise.enabled {
            return 0;
        }
        let probability = noise.probability.clamp(0.0, 1.0);
        if probability.is_nan() {
            return 0;
        }
        let mut weakened = 0;
        for row in self.edges.values_mut() {
            for weight in row.values_mut() {
                if rng.gen_bool(probability) {
                    let reduced = ((*weight - noise.decrement) * 10.0).round() / 10.0;
                    *weight = reduced.max(0.0);
                    weakened += 1;
                }
            }
        }
        weakened
    }

    pub fn curated() -> Self {
        let mut graph = Self::empty();
        for (donor, row) in CURATED {
            for (recipient, weight) in row.iter() {
                graph.set_weight(donor, recipient, *weight);
            }
        }
        graph
    }
}

impl Default for RelationsGraph {
    fn default() -> Self {
        Self::curated()
    }
}

type Row = &'static [(&'static str, f64)];

const CURATED: &[(&str, Row)] = &[
    (
        "USA",
        &[
            ("Canada", 1.5),
            ("UK", 1.4),
            ("Germany", 1.3),
            ("India", 0.4),
            ("China", 0.2),
            ("Mexico", 0.2),
            ("Brazil", 0.2),
            ("Australia", 1.3),
        ],
    ),
    (
        "Canada",
        &[
            ("USA", 1.5),
            ("UK", 1.3),
            ("France", 1.2),
            ("Germany", 1.1),
            ("Mexico", 0.2),
            ("Brazil", 0.2),
            ("Argentina", 0.2),
            ("Chile", 0.2),
            ("India", 0.4),
            ("China", 0.2),
            ("Japan", 1.0),
            ("Australia", 1.0),
            ("New Zealand", 1.0),
            ("South Africa", 0.2),
            ("Nigeria", 0.2),
            ("Kenya", 0.2),
        ],
    ),
    (
        "Mexico",
        &[
            ("USA", 0.2),
            ("Brazil", 0.2),
            ("Argentina", 0.2),
            ("Canada", 0.2),
            ("UK", 1.0),
            ("France", 1.0),
            ("Germany", 1.0),
            ("Chile", 0.2),
            ("India", 0.4),
            ("China", 0.2),
            ("Japan", 1.0),
            ("Australia", 1.0),
            ("New Zealand", 1.0),
            ("South Africa", 0.2),
            ("Nigeria", 0.2),
            ("Kenya", 0.2),
        ],
    ),
    (
        "Brazil",
        &[
            ("Argentina", 0.2),
            ("Chile", 0.2),
            ("Mexico", 0.2),
            ("USA", 0.2),
            ("Canada", 0.2),
            ("UK", 1.0),
            ("France", 1.0),
            ("Germany", 1.0),
            ("India", 0.4),
            ("China", 0.2),
            ("Japan", 1.0),
            ("Australia", 1.0),
            ("New Zealand", 1.0),
            ("South Africa", 0.2),
            ("Nigeria", 0.2),
            ("Kenya", 0.2),
        ],
    ),
    (
        "Argentina",
        &[
            ("Brazil", 0.2),
            ("Chile", 0.2),
            ("Mexico", 0.2),
            ("USA", 0.2),
            ("Canada", 0.2),
            ("UK", 1.0),
            ("France", 1.0),
            ("Germany", 1.0),
            ("India", 0.4),
            ("China", 0.2),
            ("Japan", 1.0),
            ("Australia", 1.0),
            ("New Zealand", 1.0),
            ("South Africa", 0.2),
            ("Nigeria", 0.2),
            ("Kenya", 0.2),
        ],
    ),
    (
        "Chile",
        &[
            ("Brazil", 0.2),
            ("Argentina", 0.2),
            ("Mexico", 0.2),
            ("USA", 0.2),
            ("Canada", 0.2),
            ("UK", 1.0),
            ("France", 1.0),
            ("Germany", 1.0),
            ("India", 0.4),
            ("China", 0.2),
            ("Japan", 1.0),
            ("Australia", 1.0),
            ("New Zealand", 1.0),
            ("South Africa", 0.2),
            ("Nigeria", 0.2),
            ("Kenya", 0.2),
        ],
    ),
    (
        "UK",
        &[
            ("USA", 1.4),
            ("France", 1.3),
            ("India", 0.4),
            ("Germany", 1.4),
            ("Canada", 1.3),
            ("Australia", 1.2),
            ("Mexico", 0.2),
            ("Brazil", 0.2),
            ("Argentina", 0.2),
            ("Chile", 0.2),
            ("China", 0.2),
            ("Japan", 1.0),
            ("New Zealand", 1.0),
            ("South Africa", 0.2),
            ("Nigeria", 0.2),
            ("Kenya", 0.2),
        ],
    ),
    (
        "Germany",
        &[
            ("France", 1.3),
            ("UK", 1.4),
            ("USA", 1.3),
            ("Canada", 1.1),
            ("Mexico", 0.2),
            ("Brazil", 0.2),
            ("Argentina", 0.2),
            ("Chile", 0.2),
            ("India", 0.4),
            ("China", 0.2),
            ("Japan", 1.0),
            ("Australia", 1.0),
            ("New Zealand", 1.0),
            ("South Africa", 0.2),
            ("Nigeria", 0.2),
            ("Kenya", 0.2),
        ],
    ),
    (
        "France",
        &[
            ("Germany", 1.3),
            ("UK", 1.3),
            ("Canada", 1.2),
            ("USA", 1.2),
            ("Mexico", 0.2),
            ("Brazil", 0.2),
            ("Argentina", 0.2),
            ("Chile", 0.2),
            ("India", 0.4),
            ("China", 0.2),
            ("Japan", 1.0),
            ("Australia", 1.0),
            ("New Zealand", 1.0),
            ("South Africa", 0.2),
            ("Nigeria", 0.2),
            ("Kenya", 0.2),
        ],
    ),
    (
        "China",
        &[
            ("Pakistan", 1.5),
            ("Russia", 1.4),
            ("India", 0.4),
            ("USA", 0.2),
            ("Japan", 0.8),
            ("Canada", 0.2),
            ("Mexico", 0.2),
            ("Brazil", 0.2),
            ("Argentina", 0.2),
            ("Chile", 0.2),
            ("UK", 0.2),
            ("France", 1.0),
            ("Germany", 1.0),
            ("Australia", 1.0),
            ("New Zealand", 1.0),
            ("South Africa", 0.2),
            ("Nigeria", 0.2),
            ("Kenya", 0.2),
        ],
    ),
    (
        "India",
        &[
            ("USA", 0.4),
            ("UK", 0.4),
            ("China", 0.4),
            ("Japan", 0.4),
            ("Canada", 0.4),
            ("Mexico", 0.4),
            ("Brazil", 0.4),
            ("Argentina", 0.4),
            ("Chile", 0.4),
            ("France", 0.4),
            ("Germany", 0.4),
            ("Australia", 0.4),
            ("New Zealand", 0.4),
            ("South Africa", 0.4),
            ("Nigeria", 0.4),
            ("Kenya", 0.4),
        ],
    ),
    (
        "Japan",
        &[
            ("China", 0.8),
            ("India", 0.4),
            ("USA", 1.1),
            ("Canada", 1.0),
            ("Mexico", 0.2),
            ("Brazil", 0.2),
            ("Argentina", 0.2),
            ("Chile", 0.2),
            ("UK", 0.2),
            ("France", 1.0),
            ("Germany", 1.0),
            ("Australia", 1.0),
            ("New Zealand", 1.0),
            ("South Africa", 0.2),
            ("Nigeria", 0.2),
            ("Kenya", 0.2),
        ],
    ),
    (
        "Australia",
        &[
            ("New Zealand", 1.5),
            ("USA", 1.3),
            ("UK", 1.2),
            ("Canada", 1.0),
            ("Mexico", 0.2),
            ("Brazil", 0.2),
            ("Argentina", 0.2),
            ("Chile", 0.2),
            ("France", 1.0),
            ("Germany", 1.0),
            ("India", 0.4),
            ("China", 0.2),
            ("Japan", 1.0),
            ("South Africa", 0.2),
            ("Nigeria", 0.2),
            ("Kenya", 0.2),
        ],
    ),
    (
        "New Zealand",
        &[
            ("Australia", 1.5),
            ("USA", 1.0),
            ("UK", 1.0),
            ("Canada", 1.0),
            ("France", 1.0),
            ("Germany", 1.0),
            ("Mexico", 0.2),
            ("Brazil", 0.2),
            ("Argentina", 0.2),
            ("Chile", 0.2),
            ("India", 0.4),
            ("China", 0.2),
            ("Japan", 1.0),
            ("South Africa", 0.2),
            ("Nigeria", 0.2),
            ("Kenya", 0.2),
        ],
    ),
    (
        "South Africa",
        &[
            ("Nigeria", 0.2),
            ("Kenya", 0.2),
            ("USA", 0.2),
            ("Canada", 0.2),
            ("Mexico", 0.2),
            ("Brazil", 0.2),
            ("Argentina", 0.2),
            ("Chile", 0.2),
            ("UK", 0.2),
            ("France", 0.2),
            ("Germany", 0.2),
            ("India", 0.4),
            ("China", 0.2),
            ("Japan", 0.2),
            ("Australia", 0.2),
            ("New Zealand", 0.2),
        ],
    ),
    (
        "Nigeria",
        &[
            ("South Africa", 0.2),
            ("Kenya", 0.2),
            ("USA", 0.2),
            ("Canada", 0.2),
            ("Mexico", 0.2),
            ("Brazil", 0.2),
            ("Argentina", 0.2),
            ("Chile", 0.2),
            ("UK", 0.2),
            ("France", 0.2),
            ("Germany", 0.2),
            ("India", 0.4),
            ("China", 0.2),
            ("Japan", 0.2),
            ("Australia", 0.2),
            ("New Zealand", 0.2),
        ],
    ),
    (
        "Kenya",
        &[
            ("South Africa", 0.2),
            ("Nigeria", 0.2),
            ("USA", 0.2),
            ("Canada", 0.2),
            ("Mexico", 0.2),
            ("Brazil", 0.2),
            ("Argentina", 0.2),
            ("Chile", 0.2),
            ("UK", 0.2),
            ("France", 0.2),
            ("Germany", 0.2),
            ("India", 0.4),
            ("China", 0.2),
            ("Japan", 0.2),
            ("Australia", 0.2),
            ("New Zealand", 0.2),
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn absent_pair_scores_neutral() {
        let graph = RelationsGraph::curated();
        assert_eq!(graph.weight("Kenya", "Pakistan"), None);
        let score = graph.relation_score("Kenya", "Pakistan");
        assert!((score - (-1.0_f64).exp()).abs() < 1e-12);
        assert!((score - 0.3679).abs() < 1e-4);
    }

    #[test]
    fn negative_or_non_finite_weights_fail_validation() {
        assert!(RelationsGraph::curated().validate().is_ok());
        for weight in [-0.5, f64::NAN, f64::INFINITY] {
            let graph = RelationsGraph::empty().with_edge("USA", "Kenya", weight);
            assert!(matches!(
                graph.validate(),
                Err(GenerationError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn noise_settings_are_checked() {
        assert!(RelationsNoise::default().validate().is_ok());
        let broken = [
            RelationsNoise {
                probability: f64::NAN,
                ..RelationsNoise::default()
            },
            RelationsNoise {
                probability: 1.5,
                ..RelationsNoise::default()
            },
            RelationsNoise {
                decrement: f64::INFINITY,
                ..RelationsNoise::default()
            },
        ];
        for noise in broken {
            assert!(noise.validate().is_err(), "{noise:?}");
        }
    }

    #[test]
    fn closer_ties_score_lower() {
        let graph = RelationsGraph::curated();
        let allies = graph.relation_score("USA", "Canada");
        let distant = graph.relation_score("USA", "China");
        assert!(allies < distant);
        assert!((allies - (-1.5_f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn weights_are_directed() {
        let graph = RelationsGraph::curated();
        assert_eq!(graph.weight("Japan", "USA"), Some(1.1));
        assert_eq!(graph.weight("USA", "Japan"), None);
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        let graph = RelationsGraph::curated();
        for donor in graph.donors() {
            for recipient in graph.donors() {
                let score = graph.relation_score(donor, recipient);
                assert!(score > 0.0 && score <= 1.0, "{donor}->{recipient}: {score}");
            }
        }
    }

    #[test]
    fn curated_table_lists_seventeen_donors() {
        let graph = RelationsGraph::curated();
        assert_eq!(graph.donors().len(), 17);
        assert_eq!(graph.weight("Kenya", "Nigeria"), Some(0.2));
        assert_eq!(graph.weight("New Zealand", "Australia"), Some(1.5));
    }

    #[test]
    fn perturbation_is_seeded_and_bounded() {
        let noise = RelationsNoise::default();
        let mut a = RelationsGraph::curated();
        let mut b = RelationsGraph::curated();
        let weakened_a = a.perturb(&mut ChaCha8Rng::seed_from_u64(11), &noise);
        let weakened_b = b.perturb(&mut ChaCha8Rng::seed_from_u64(11), &noise);
        assert_eq!(a, b);
        assert_eq!(weakened_a, weakened_b);
        assert!(weakened_a > 0 && weakened_a < a.edge_count());

        let original = RelationsGraph::curated();
        for donor in original.donors() {
            for recipient in original.donors() {
                if let (Some(before), Some(after)) =
                    (original.weight(donor, recipient), a.weight(donor, recipient))
                {
                    let delta = before - after;
                    assert!(delta.abs() < 1e-9 || (delta - 0.1).abs() < 1e-9);
                }
            }
        }
    }

    #[test]
    fn disabled_noise_leaves_graph_untouched() {
        let noise = RelationsNoise {
            enabled: false,
            ..RelationsNoise::default()
        };
        let mut graph = RelationsGraph::curated();
        let weakened = graph.perturb(&mut ChaCha8Rng::seed_from_u64(1), &noise);
        assert_eq!(weakened, 0);
        assert_eq!(graph, RelationsGraph::curated());
    }

    #[test]
    fn perturbation_never_goes_negative() {
        let noise = RelationsNoise {
            enabled: true,
            probability: 1.0,
            decrement: 0.5,
        };
        let mut graph = RelationsGraph::empty().with_edge("A", "B", 0.2);
        graph.perturb(&mut ChaCha8Rng::seed_from_u64(1), &noise);
        assert_eq!(graph.weight("A", "B"), Some(0.0));
        assert_eq!(graph.relation_score("A", "B"), 1.0);
    }
}
