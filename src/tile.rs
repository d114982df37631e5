pub mod classifier;
pub mod color_scorer;
pub mod morphology;
pub mod particle;
pub mod reader;
pub mod segmentation;

pub use classifier::{classify, ParticleStatistics, TileClassification};
pub use color_scorer::{ColorMeasurements, ColorPhenotypeScorer};
pub use particle::{Particle, ParticleTable};
pub use reader::{read_tile, TileReaderInput, TileReaderOutput};
pub use segmentation::{ParticleSegmenter, Segmentation};
