use std::io::Write;

use super::MeasurementSink;
use crate::{error::Error, tile::TileReaderOutput, Result};

const COLUMNS: [&str; 17] = [
    "row",
    "column",
    "colonySize",
    "circularity",
    "colonyOpacity",
    "morphologyScoreFixedCircles",
    "morphologyScoreWholeColony",
    "normalizedMorphologyScore",
    "inAgarSize",
    "inAgarCircularity",
    "inAgarOpacity",
    "wholeTileOpacity",
    "colorIntensitySum",
    "biofilmArea",
    "colorIntensitySumInBiofilmArea",
    "relativeColorIntensity",
    "error",
];

/// Tab separated report, one header line and one line per tile.
pub struct TsvReportWriter<W: Write> {
    writer: W,
    header_written: bool,
}

impl<W: Write> TsvReportWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            header_written: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_header_once(&mut self) -> Result<()> {
        if self.header_written {
            return Ok(());
        }
        writeln!(self.writer, "{}", COLUMNS.join("\t")).map_err(Error::FailedToWriteReport)?;
        self.header_written = true;
        Ok(())
    }

    fn format_record(record: &TileReaderOutput) -> String {
        let fields = [
            record.row.to_string(),
            record.column.to_string(),
            record.colony_size.to_string(),
            Self::format_real(record.circularity),
            record.colony_opacity.to_string(),
            Self::format_real(record.morphology_score_fixed_circles),
            Self::format_real(record.morphology_score_whole_colony),
            Self::format_real(record.normalized_morphology_score),
            record.in_agar_size.to_string(),
            Self::format_real(record.in_agar_circularity),
            record.in_agar_opacity.to_string(),
            record.whole_tile_opacity.to_string(),
            record.color_intensity_sum.to_string(),
            record.biofilm_area.to_string(),
            record.color_intensity_sum_in_biofilm_area.to_string(),
            record.relative_color_intensity.to_string(),
            u8::from(record.has_error()).to_string(),
        ];
        fields.join("\t")
    }

    fn format_real(value: f64) -> String {
        if value == 0.0 {
            return "0".to_owned();
        }
        format!("{:.4}", value)
    }
}

impl<W: Write> MeasurementSink for TsvReportWriter<W> {
    fn accept(&mut self, record: &TileReaderOutput) -> Result<()> {
        self.write_header_once()?;
        writeln!(self.writer, "{}", Self::format_record(record))
            .map_err(Error::FailedToWriteReport)
    }

    fn finish(&mut self) -> Result<()> {
        self.write_header_once()?;
        self.writer.flush().map_err(Error::FailedToWriteReport)
    }
}
