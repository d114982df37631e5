use crate::image::Region;

/// One connected foreground component of a binarized tile.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Label of the component in the segmentation's label map.
    pub label: u32,
    pub area: usize,
    pub perimeter: f64,
    pub bounding_box: Region,
    pub centroid: (f64, f64),
    /// `4π·area/perimeter²`, close to 1 for a disk. Not clamped, so
    /// digitization noise may push it slightly above 1.
    pub circularity: f64,
    /// Major over minor axis of the ellipse with the same second moments.
    pub aspect_ratio: f64,
}

/// Particles of one tile in detection order (raster order of each
/// component's first pixel).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleTable {
    particles: Vec<Particle>,
}

impl ParticleTable {
    pub fn new(particles: Vec<Particle>) -> Self {
        Self { particles }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    /// Index of the particle with the largest area; the earliest one wins ties.
    pub fn largest_index(&self) -> Option<usize> {
        let mut largest: Option<(usize, usize)> = None;
        for (index, particle) in self.particles.iter().enumerate() {
            match largest {
                Some((_, area)) if area >= particle.area => {}
                _ => largest = Some((index, particle.area)),
            }
        }
        largest.map(|(index, _)| index)
    }

    pub fn largest(&self) -> Option<&Particle> {
        self.largest_index().and_then(|index| self.get(index))
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::{Particle, ParticleTable};
    use crate::image::Region;

    pub fn particle_with_area(label: u32, area: usize) -> Particle {
        Particle {
            label,
            area,
            perimeter: 4.0,
            bounding_box: Region::new(1, 1, 1, 1),
            centroid: (1.5, 1.5),
            circularity: 0.8,
            aspect_ratio: 1.0,
        }
    }

    #[test]
    fn largest_prefers_first_on_ties() {
        let table = ParticleTable::new(vec![
            particle_with_area(1, 10),
            particle_with_area(2, 30),
            particle_with_area(3, 30),
        ]);
        assert_eq!(table.largest_index(), Some(1));
        assert_eq!(table.largest().map(|p| p.label), Some(2));
    }

    #[test]
    fn empty_table_has_no_largest() {
        let table = ParticleTable::default();
        assert!(table.is_empty());
        assert_eq!(table.largest_index(), None);
    }
}
