use crate::{tile::TileReaderOutput, Result};

mod tsv;

pub use tsv::TsvReportWriter;

/// Receives one measurement record per tile, in row-major tile order.
pub trait MeasurementSink {
    fn accept(&mut self, record: &TileReaderOutput) -> Result<()>;

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<TileReaderOutput>,
}

impl MeasurementSink for MemorySink {
    fn accept(&mut self, record: &TileReaderOutput) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}
