use crate::image::Region;

/// One grid cell of the plate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tile {
    pub row: u32,
    pub column: u32,
    pub region: Region,
}

pub trait GridPartition {
    /// Splits the cropped grid into tiles in row-major order.
    fn partition(&self, grid: Region) -> Vec<Tile>;
}

/// Equal sized cells. Boundaries are placed at `i * size / count`, so the
/// tiles cover the grid without gaps or overlaps even when the size is not
/// divisible by the count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformGridPartition {
    pub rows: u32,
    pub columns: u32,
}

impl Default for UniformGridPartition {
    fn default() -> Self {
        Self {
            rows: 8,
            columns: 12,
        }
    }
}

impl UniformGridPartition {
    pub fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }

    fn boundaries(origin: u32, size: u32, count: u32) -> Vec<u32> {
        (0..=count)
            .map(|i| origin + (i as u64 * size as u64 / count as u64) as u32)
            .collect()
    }
}

impl GridPartition for UniformGridPartition {
    fn partition(&self, grid: Region) -> Vec<Tile> {
        if self.rows == 0 || self.columns == 0 {
            return Vec::new();
        }
        let xs = Self::boundaries(grid.x, grid.width, self.columns);
        let ys = Self::boundaries(grid.y, grid.height, self.rows);
        let mut tiles = Vec::with_capacity((self.rows * self.columns) as usize);
        for row in 0..self.rows {
            for column in 0..self.columns {
                let (left, right) = (xs[column as usize], xs[column as usize + 1]);
                let (top, bottom) = (ys[row as usize], ys[row as usize + 1]);
                tiles.push(Tile {
                    row,
                    column,
                    region: Region::from_corners(left, top, right, bottom),
                });
            }
        }
        tiles
    }
}
