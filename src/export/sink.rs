//! Backend-neutral table emission.
//!
//! `TableSink` is the narrow seam between the Layout Planner and a concrete
//! document library: merge a range, write a cell, place an image. Each
//! backend implements it over its own geometry (worksheet rows, or absolute
//! page coordinates), which keeps every library-specific merge/anchor idiom
//! out of the planner.

use super::images::{decode_image_payload, DecodedImage};
use super::plan::{RowBlock, ROWS_PER_BLOCK};

/// Inclusive cell range, rows and columns relative to the body origin
/// (row 0 = first row of the first block).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridRange {
    pub first_row: usize,
    pub first_col: usize,
    pub last_row: usize,
    pub last_col: usize,
}

impl GridRange {
    /// A single-column vertical span.
    pub fn vertical(first_row: usize, last_row: usize, col: usize) -> Self {
        Self {
            first_row,
            first_col: col,
            last_row,
            last_col: col,
        }
    }
}

/// Styling class of a body cell; backends map this to their own formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyCell {
    /// Vertically merged single-value cell: centered, wrapped.
    Merged,
    /// Labeled sub-line cell: left-aligned, indented, wrapped.
    Label,
}

/// Minimal table operations a document backend must provide.
pub trait TableSink {
    type Error: std::fmt::Display;

    /// Merge `range` and write `text` into its anchor cell.
    fn merge_cells(&mut self, range: GridRange, text: &str, style: BodyCell)
        -> Result<(), Self::Error>;

    /// Write one physical cell. Called for every unmerged body cell, empty
    /// text included, so each cell receives its border.
    fn set_cell_text(
        &mut self,
        row: usize,
        col: usize,
        text: &str,
        style: BodyCell,
    ) -> Result<(), Self::Error>;

    /// Place a decoded raster image over `range`, stretched to its extents.
    fn place_image(&mut self, range: GridRange, image: &DecodedImage) -> Result<(), Self::Error>;
}

/// Emit all proforma row blocks through a sink.
///
/// Merges and cell writes propagate backend failures; image decoding and
/// image placement are per-image recoverable — logged and skipped without
/// touching the rest of the document.
pub fn emit_row_blocks<S: TableSink>(blocks: &[RowBlock<'_>], sink: &mut S) -> Result<(), S::Error> {
    for (index, block) in blocks.iter().enumerate() {
        let top = index * ROWS_PER_BLOCK;
        let bottom = top + ROWS_PER_BLOCK - 1;

        sink.merge_cells(
            GridRange::vertical(top, bottom, 0),
            &block.serial,
            BodyCell::Merged,
        )?;
        sink.merge_cells(GridRange::vertical(top, bottom, 2), &block.dob, BodyCell::Merged)?;
        sink.merge_cells(
            GridRange::vertical(top, bottom, 4),
            &block.course,
            BodyCell::Merged,
        )?;
        // Image columns merge to empty text; a record without a photo or
        // signature renders an empty cell, never a placeholder glyph.
        sink.merge_cells(GridRange::vertical(top, bottom, 7), "", BodyCell::Merged)?;
        sink.merge_cells(GridRange::vertical(top, bottom, 8), "", BodyCell::Merged)?;

        for offset in 0..ROWS_PER_BLOCK {
            let row = top + offset;
            sink.set_cell_text(row, 1, &block.student_lines[offset], BodyCell::Label)?;
            sink.set_cell_text(row, 3, &block.contact_lines[offset], BodyCell::Label)?;
            sink.set_cell_text(row, 5, &block.academic_lines[offset], BodyCell::Label)?;
            sink.set_cell_text(row, 6, &block.previous_lines[offset], BodyCell::Label)?;
        }

        place_optional_image(sink, GridRange::vertical(top, bottom, 7), block.photo, "photo", &block.serial);
        place_optional_image(
            sink,
            GridRange::vertical(top, bottom, 8),
            block.signature,
            "signature",
            &block.serial,
        );
    }
    Ok(())
}

fn place_optional_image<S: TableSink>(
    sink: &mut S,
    range: GridRange,
    payload: Option<&str>,
    kind: &str,
    serial: &str,
) {
    let Some(payload) = payload else { return };
    match decode_image_payload(payload) {
        Ok(image) => {
            if let Err(e) = sink.place_image(range, &image) {
                log::warn!("skipping {} for record {}: {}", kind, serial, e);
            }
        }
        Err(e) => log::warn!("skipping {} for record {}: {}", kind, serial, e),
    }
}
