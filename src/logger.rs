use crate::tile::TileReaderOutput;

#[ctor::ctor]
fn init() {
    use log4rs;
    if let Err(e) = log4rs::init_file("log4rs.yaml", Default::default()) {
        eprintln!("Logging disabled, could not load log4rs.yaml: {}", e);
    }
}

pub fn log_tile_outcome(output: &TileReaderOutput) {
    let outcome = match (output.timed_out, output.segmentation_failed, output.colony_found) {
        (true, _, _) => "timed out",
        (_, true, _) => "failed",
        (_, _, true) => "colony",
        _ => "empty",
    };
    log::debug!(
        "Tile ({:>2}, {:>2}) {:<9} size {:>6} color {:>8} biofilm {:>6}",
        output.row,
        output.column,
        outcome,
        output.colony_size,
        output.color_intensity_sum,
        output.biofilm_area
    );
}
