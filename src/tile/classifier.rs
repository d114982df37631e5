//! Decides whether a segmented tile holds a colony.
//!
//! The decision is an ordered list of rules over plain particle statistics.
//! Rules run in order; the first one that returns a verdict ends the
//! evaluation, the others either add a penalty point or pass. The constants
//! are calibrated for one optical setup and must not be tuned here.

use super::particle::ParticleTable;
use crate::image::Region;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TileClassification {
    Empty,
    NotEmpty,
}

/// The values the rules look at: how many particles the tile has and the
/// shape of the largest one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleStatistics {
    pub particle_count: usize,
    pub largest_aspect_ratio: f64,
    pub largest_circularity: f64,
    pub largest_bounding_box: Region,
}

impl ParticleStatistics {
    /// `None` for an empty table. Segmentation reports such tiles as failed
    /// before classification, so there is no verdict for them here.
    pub fn from_table(particles: &ParticleTable) -> Option<Self> {
        let largest = particles.largest()?;
        Some(Self {
            particle_count: particles.len(),
            largest_aspect_ratio: largest.aspect_ratio,
            largest_circularity: largest.circularity,
            largest_bounding_box: largest.bounding_box,
        })
    }
}

enum Step {
    Decide(TileClassification),
    Penalize,
    Pass,
}

type Rule = fn(&ParticleStatistics, u32) -> Step;

const RULES: [(&str, Rule); 9] = [
    ("too many particles", too_many_particles),
    ("many particles", many_particles),
    ("elongated contamination", elongated),
    ("slightly elongated", slightly_elongated),
    ("irregular outline", irregular_outline),
    ("single particle", single_particle),
    ("penalty limit", penalty_limit),
    ("clipped at origin", clipped_at_origin),
    ("default", default_not_empty),
];

fn too_many_particles(stats: &ParticleStatistics, _: u32) -> Step {
    if stats.particle_count > 40 {
        return Step::Decide(TileClassification::Empty);
    }
    Step::Pass
}

fn many_particles(stats: &ParticleStatistics, _: u32) -> Step {
    if stats.particle_count > 15 {
        return Step::Penalize;
    }
    Step::Pass
}

fn elongated(stats: &ParticleStatistics, _: u32) -> Step {
    if stats.largest_aspect_ratio > 2.0 {
        return Step::Decide(TileClassification::Empty);
    }
    Step::Pass
}

fn slightly_elongated(stats: &ParticleStatistics, _: u32) -> Step {
    if stats.largest_aspect_ratio > 1.2 {
        return Step::Penalize;
    }
    Step::Pass
}

fn irregular_outline(stats: &ParticleStatistics, _: u32) -> Step {
    if stats.largest_circularity < 0.20 {
        return Step::Decide(TileClassification::Empty);
    }
    Step::Pass
}

fn single_particle(stats: &ParticleStatistics, _: u32) -> Step {
    if stats.particle_count == 1 {
        return Step::Decide(TileClassification::NotEmpty);
    }
    Step::Pass
}

fn penalty_limit(_: &ParticleStatistics, penalty: u32) -> Step {
    if penalty > 1 {
        return Step::Decide(TileClassification::Empty);
    }
    Step::Pass
}

fn clipped_at_origin(stats: &ParticleStatistics, _: u32) -> Step {
    let bounding_box = stats.largest_bounding_box;
    if bounding_box.x != 0 || bounding_box.y != 0 {
        return Step::Pass;
    }
    if stats.largest_circularity > 0.5 {
        Step::Decide(TileClassification::NotEmpty)
    } else {
        Step::Decide(TileClassification::Empty)
    }
}

fn default_not_empty(_: &ParticleStatistics, _: u32) -> Step {
    Step::Decide(TileClassification::NotEmpty)
}

/// Verdict plus the name of the rule that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decision {
    pub classification: TileClassification,
    pub rule: &'static str,
}

pub fn decide(stats: &ParticleStatistics) -> Decision {
    let mut penalty = 0;
    for &(name, rule) in RULES.iter() {
        match rule(stats, penalty) {
            Step::Decide(classification) => {
                return Decision {
                    classification,
                    rule: name,
                }
            }
            Step::Penalize => penalty += 1,
            Step::Pass => {}
        }
    }
    Decision {
        classification: TileClassification::NotEmpty,
        rule: "default",
    }
}

pub fn classify(stats: &ParticleStatistics) -> TileClassification {
    decide(stats).classification
}
