//! Runs a whole plate: grid location, partition and parallel tile reading.

use std::sync::{
    mpsc::{self, Receiver, RecvTimeoutError},
    Arc,
};

use threadpool::ThreadPool;

use crate::{
    error::Error,
    image::{Region, RgbImage},
    plate::{locate_grid, GridPartition, Tile},
    report::MeasurementSink,
    settings::Settings,
    tile::{read_tile, TileReaderInput, TileReaderOutput},
    Result,
};

/// Result of analysing one plate. Records are in row-major tile order.
#[derive(Clone, Debug, PartialEq)]
pub struct PlateReport {
    pub border: Option<Region>,
    pub grid: Region,
    pub records: Vec<TileReaderOutput>,
}

impl PlateReport {
    pub fn write_to(&self, sink: &mut impl MeasurementSink) -> Result<()> {
        for record in self.records.iter() {
            sink.accept(record)?;
        }
        sink.finish()
    }
}

pub struct PlateAnalyzer<'a, P: GridPartition> {
    settings: Arc<Settings>,
    partition: &'a P,
    threadpool: &'a ThreadPool,
}

impl<'a, P: GridPartition> PlateAnalyzer<'a, P> {
    pub fn new(settings: Settings, partition: &'a P, threadpool: &'a ThreadPool) -> Self {
        PlateAnalyzer {
            settings: Arc::new(settings),
            partition,
            threadpool,
        }
    }

    /// Locates the grid, or reuses `grid_override`, and reads every tile on
    /// the thread pool. Only grid location errors fail the plate; tile
    /// failures end up as flagged records.
    pub fn analyze(&self, image: RgbImage, grid_override: Option<Region>) -> Result<PlateReport> {
        let location = locate_grid(&image, &self.settings, grid_override)?;
        let grid = location.grid;
        if !grid.fits_within(image.width(), image.height()) {
            return Err(Error::RegionOutOfBounds {
                region: grid.to_string(),
                width: image.width(),
                height: image.height(),
            });
        }
        let tiles = self.partition.partition(grid);
        log::info!(
            "Dispatching {} tiles to {} workers",
            tiles.len(),
            self.threadpool.max_count()
        );
        let receiver = self.dispatch(Arc::new(image), &tiles);
        let records = self.collect(receiver, &tiles);
        Ok(PlateReport {
            border: location.border,
            grid,
            records,
        })
    }

    fn dispatch(&self, image: Arc<RgbImage>, tiles: &[Tile]) -> Receiver<(usize, TileReaderOutput)> {
        let (sender, receiver) = mpsc::channel();
        for (index, &tile) in tiles.iter().enumerate() {
            let image = Arc::clone(&image);
            let settings = Arc::clone(&self.settings);
            let sender = sender.clone();
            self.threadpool.execute(move || {
                let output = read_tile_of_plate(&image, tile, &settings);
                // the collector may have stopped waiting
                let _ = sender.send((index, output));
            });
        }
        receiver
    }

    fn collect(
        &self,
        receiver: Receiver<(usize, TileReaderOutput)>,
        tiles: &[Tile],
    ) -> Vec<TileReaderOutput> {
        let mut slots: Vec<Option<TileReaderOutput>> = vec![None; tiles.len()];
        let mut outstanding = tiles.len();
        let mut timed_out = false;
        while outstanding > 0 {
            let received = match self.settings.tile_timeout {
                Some(timeout) => receiver.recv_timeout(timeout),
                None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok((index, output)) => {
                    if slots[index].replace(output).is_none() {
                        outstanding -= 1;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!("{} tiles did not finish in time", outstanding);
                    timed_out = true;
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    log::warn!("{} tiles ended without a result", outstanding);
                    break;
                }
            }
        }
        slots
            .into_iter()
            .zip(tiles)
            .map(|(slot, tile)| match slot {
                Some(output) => output,
                None if timed_out => TileReaderOutput::timed_out(tile.row, tile.column),
                None => TileReaderOutput::failed(tile.row, tile.column),
            })
            .collect()
    }
}

/// Copies the tile into its own buffer and reads it. The copy is dropped
/// once the record exists.
fn read_tile_of_plate(image: &RgbImage, tile: Tile, settings: &Settings) -> TileReaderOutput {
    match image.duplicate_region(tile.region) {
        Ok(buffer) => read_tile(TileReaderInput::new(tile.row, tile.column, buffer, settings)),
        Err(e) => {
            log::warn!("Tile ({}, {}) not readable: {}", tile.row, tile.column, e);
            TileReaderOutput::failed(tile.row, tile.column)
        }
    }
}
