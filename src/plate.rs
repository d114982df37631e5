use crate::{color::Intensity, image::Image, image::Region, settings::Settings, Result};

pub mod border;
pub mod crop;
pub mod grid;

pub use border::PlateBorderDetector;
pub use crop::GridCropper;
pub use grid::{GridPartition, Tile, UniformGridPartition};

/// Where the colony grid sits inside a raw plate photo.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridLocation {
    /// Physical plate border, `None` when a confirmed region was reused.
    pub border: Option<Region>,
    pub grid: Region,
}

/// Finds the colony grid: plate border first, then the tight crop inside it.
/// A user confirmed region short-circuits both detectors and is reused as is.
pub fn locate_grid<T: Intensity>(
    image: &Image<T>,
    settings: &Settings,
    confirmed_region: Option<Region>,
) -> Result<GridLocation> {
    if let Some(grid) = confirmed_region {
        log::info!("Reusing confirmed grid region {}", grid);
        return Ok(GridLocation { border: None, grid });
    }
    let border = PlateBorderDetector::new(&settings.border).detect(image)?;
    log::info!("Plate border found at {}", border);
    let grid = GridCropper::new(&settings.crop).crop(image, border)?;
    log::info!("Colony grid cropped to {}", grid);
    Ok(GridLocation {
        border: Some(border),
        grid,
    })
}
