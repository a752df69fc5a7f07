//! PDF backend adapter.
//!
//! Realizes a `DocumentPlan` as a paginated, landscape, grid-ruled table.
//! The institutional letterhead is drawn once on page 1; the certification
//! footer and page number are drawn on every page; the column-header row is
//! repeated whenever the table spills onto a new page. Grid lines are drawn
//! manually so the five vertically merged proforma columns keep a single
//! unbroken cell outline.

use printpdf::{
    BuiltinFont, Color, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Rgb,
};
use std::io::BufWriter;

use super::images::DecodedImage;
use super::plan::{BodyPlan, ColumnSpec, DocumentPlan, PROFORMA_COLUMNS, SIMPLE_PDF_COLUMNS};
use super::sink::{emit_row_blocks, BodyCell, GridRange, TableSink};

// A4 landscape geometry, millimetres. `Mm` wraps f32, so everything on this
// page stays f32.
const PAGE_W: f32 = 297.0;
const PAGE_H: f32 = 210.0;
const MARGIN: f32 = 10.0;

/// Top of the table on page 1, below the letterhead block.
const FIRST_PAGE_TABLE_TOP: f32 = 168.0;
/// Top of the table on continuation pages.
const CONT_PAGE_TABLE_TOP: f32 = 198.0;
/// The table never draws below this line; the footer lives underneath.
const BOTTOM_LIMIT: f32 = 18.0;
const FOOTER_Y: f32 = 10.0;

const COLUMN_HEADER_H: f32 = 8.0;
/// Height of one physical proforma row; a block is five of these.
const BLOCK_ROW_H: f32 = 8.0;
const LIST_ROW_H: f32 = 7.0;

const CELL_PAD: f32 = 1.5;
const PT_TO_MM: f32 = 0.352_778;
/// Rough average Helvetica glyph width in em; builtin fonts expose no
/// metrics, so centering and truncation work off this approximation.
const CHAR_WIDTH_EM: f32 = 0.5;

const BODY_FONT_PT: f32 = 7.0;
const HEADER_FONT_PT: f32 = 8.0;

struct PdfFonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

/// Build the PDF for a plan and serialize it to an in-memory buffer.
pub fn build_pdf(plan: &DocumentPlan<'_>) -> Result<Vec<u8>, super::ExportError> {
    let (doc, first_page, first_layer) = PdfDocument::new(
        plan.header.title_line.clone(),
        Mm(PAGE_W),
        Mm(PAGE_H),
        "Layer 1",
    );
    let fonts = PdfFonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
        italic: doc.add_builtin_font(BuiltinFont::HelveticaOblique)?,
    };

    let first = doc.get_page(first_page).get_layer(first_layer);
    draw_letterhead(&first, plan, &fonts);

    match &plan.body {
        BodyPlan::Blocks(blocks) => render_proforma_pages(&doc, first, plan, blocks, &fonts),
        BodyPlan::Rows(rows) => render_list_pages(&doc, first, plan, rows, &fonts),
    }

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer)?;
    writer
        .into_inner()
        .map_err(|e| super::ExportError::PdfBuffer(e.into_error()))
}

/// Letterhead text block, page 1 only.
fn draw_letterhead(layer: &PdfLayerReference, plan: &DocumentPlan<'_>, fonts: &PdfFonts) {
    let h = &plan.header;
    layer.use_text(
        h.institution_name.clone(),
        14.0,
        Mm(centered_x(&h.institution_name, 14.0)),
        Mm(195.0),
        &fonts.bold,
    );
    layer.use_text(
        h.institution_address.clone(),
        10.0,
        Mm(centered_x(&h.institution_address, 10.0)),
        Mm(188.0),
        &fonts.regular,
    );
    layer.use_text(
        h.title_line.clone(),
        11.0,
        Mm(centered_x(&h.title_line, 11.0)),
        Mm(181.0),
        &fonts.bold,
    );
    layer.use_text(h.filter_line.clone(), 10.0, Mm(MARGIN + 4.0), Mm(172.0), &fonts.regular);
    layer.use_text(
        h.date_line.clone(),
        10.0,
        Mm(PAGE_W - 50.0),
        Mm(172.0),
        &fonts.regular,
    );
}

/// Certification footer and page number, drawn on every page.
fn draw_page_footer(
    layer: &PdfLayerReference,
    plan: &DocumentPlan<'_>,
    fonts: &PdfFonts,
    page_number: usize,
) {
    layer.set_fill_color(Color::Rgb(Rgb::new(0.59, 0.0, 0.0, None)));
    layer.use_text(
        plan.footer.clone(),
        9.0,
        Mm(centered_x(&plan.footer, 9.0)),
        Mm(FOOTER_Y),
        &fonts.italic,
    );
    layer.set_fill_color(Color::Rgb(Rgb::new(0.4, 0.4, 0.4, None)));
    layer.use_text(
        format!("Page {}", page_number),
        9.0,
        Mm(PAGE_W - 25.0),
        Mm(FOOTER_Y),
        &fonts.regular,
    );
    layer.set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
}

/// Bordered, bold column-header row at `top`.
fn draw_column_header(
    layer: &PdfLayerReference,
    columns: &[ColumnSpec],
    top: f32,
    fonts: &PdfFonts,
) {
    let xs = column_offsets(columns);
    prepare_grid_stroke(layer);
    for (i, spec) in columns.iter().enumerate() {
        stroke_rect(layer, xs[i], top, spec.width_mm, COLUMN_HEADER_H);
        let text = fit_text(spec.title, spec.width_mm, HEADER_FONT_PT);
        layer.use_text(
            text,
            HEADER_FONT_PT,
            Mm(xs[i] + CELL_PAD),
            Mm(top - COLUMN_HEADER_H / 2.0 - 1.0),
            &fonts.bold,
        );
    }
}

/// Proforma body: five-row blocks, never split across a page boundary.
fn render_proforma_pages(
    doc: &PdfDocumentReference,
    first_layer: PdfLayerReference,
    plan: &DocumentPlan<'_>,
    blocks: &[super::plan::RowBlock<'_>],
    fonts: &PdfFonts,
) {
    let block_h = BLOCK_ROW_H * super::plan::ROWS_PER_BLOCK as f32;
    let mut layer = first_layer;
    let mut table_top = FIRST_PAGE_TABLE_TOP;
    let mut page_number = 1usize;
    let mut remaining = blocks;

    loop {
        draw_page_footer(&layer, plan, fonts, page_number);
        draw_column_header(&layer, &PROFORMA_COLUMNS, table_top, fonts);

        let capacity = ((table_top - COLUMN_HEADER_H - BOTTOM_LIMIT) / block_h).floor() as usize;
        let take = capacity.min(remaining.len());
        let (page_blocks, rest) = remaining.split_at(take);

        let mut sink = PdfGridSink {
            layer: layer.clone(),
            columns: &PROFORMA_COLUMNS,
            top: table_top - COLUMN_HEADER_H,
            row_h: BLOCK_ROW_H,
            fonts,
        };
        prepare_grid_stroke(&sink.layer);
        // Grid drawing cannot fail; image problems are handled per-image
        // inside the sink.
        let _ = emit_row_blocks(page_blocks, &mut sink);

        remaining = rest;
        if remaining.is_empty() {
            break;
        }
        let (page, layer_idx) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        layer = doc.get_page(page).get_layer(layer_idx);
        page_number += 1;
        table_top = CONT_PAGE_TABLE_TOP;
    }
}

/// Flat listing body: one grid row per record.
fn render_list_pages(
    doc: &PdfDocumentReference,
    first_layer: PdfLayerReference,
    plan: &DocumentPlan<'_>,
    rows: &[super::plan::ListRow<'_>],
    fonts: &PdfFonts,
) {
    let xs = column_offsets(&SIMPLE_PDF_COLUMNS);
    let mut layer = first_layer;
    let mut table_top = FIRST_PAGE_TABLE_TOP;
    let mut page_number = 1usize;
    let mut remaining = rows;

    loop {
        draw_page_footer(&layer, plan, fonts, page_number);
        draw_column_header(&layer, &SIMPLE_PDF_COLUMNS, table_top, fonts);

        let capacity =
            ((table_top - COLUMN_HEADER_H - BOTTOM_LIMIT) / LIST_ROW_H).floor() as usize;
        let take = capacity.min(remaining.len());
        let (page_rows, rest) = remaining.split_at(take);

        prepare_grid_stroke(&layer);
        let body_top = table_top - COLUMN_HEADER_H;
        for (i, row) in page_rows.iter().enumerate() {
            let y_top = body_top - i as f32 * LIST_ROW_H;
            for (c, cell) in row.pdf_cells().iter().enumerate() {
                let spec = &SIMPLE_PDF_COLUMNS[c];
                stroke_rect(&layer, xs[c], y_top, spec.width_mm, LIST_ROW_H);
                layer.use_text(
                    fit_text(cell, spec.width_mm, BODY_FONT_PT),
                    BODY_FONT_PT,
                    Mm(xs[c] + CELL_PAD),
                    Mm(y_top - LIST_ROW_H / 2.0 - 1.0),
                    &fonts.regular,
                );
            }
        }

        remaining = rest;
        if remaining.is_empty() {
            break;
        }
        let (page, layer_idx) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        layer = doc.get_page(page).get_layer(layer_idx);
        page_number += 1;
        table_top = CONT_PAGE_TABLE_TOP;
    }
}

/// `TableSink` over one page's coordinate space. Body row 0 starts at `top`
/// and rows grow downward.
struct PdfGridSink<'a> {
    layer: PdfLayerReference,
    columns: &'a [ColumnSpec],
    top: f32,
    row_h: f32,
    fonts: &'a PdfFonts,
}

impl PdfGridSink<'_> {
    fn cell_origin(&self, row: usize, col: usize) -> (f32, f32) {
        let xs = column_offsets(self.columns);
        (xs[col], self.top - row as f32 * self.row_h)
    }
}

impl TableSink for PdfGridSink<'_> {
    type Error = std::convert::Infallible;

    fn merge_cells(
        &mut self,
        range: GridRange,
        text: &str,
        _style: BodyCell,
    ) -> Result<(), Self::Error> {
        let (x, y_top) = self.cell_origin(range.first_row, range.first_col);
        let w = self.columns[range.first_col].width_mm;
        let h = (range.last_row - range.first_row + 1) as f32 * self.row_h;
        stroke_rect(&self.layer, x, y_top, w, h);
        if !text.is_empty() {
            let text = fit_text(text, w, BODY_FONT_PT);
            let text_w = approx_text_width(&text, BODY_FONT_PT);
            self.layer.use_text(
                text,
                BODY_FONT_PT,
                Mm(x + ((w - text_w) / 2.0).max(CELL_PAD)),
                Mm(y_top - h / 2.0 - 1.0),
                &self.fonts.regular,
            );
        }
        Ok(())
    }

    fn set_cell_text(
        &mut self,
        row: usize,
        col: usize,
        text: &str,
        _style: BodyCell,
    ) -> Result<(), Self::Error> {
        let (x, y_top) = self.cell_origin(row, col);
        let w = self.columns[col].width_mm;
        stroke_rect(&self.layer, x, y_top, w, self.row_h);
        if !text.is_empty() {
            self.layer.use_text(
                fit_text(text, w, BODY_FONT_PT),
                BODY_FONT_PT,
                Mm(x + CELL_PAD),
                Mm(y_top - self.row_h / 2.0 - 1.0),
                &self.fonts.regular,
            );
        }
        Ok(())
    }

    /// Draw the raster stretched to the cell rectangle minus padding. The
    /// stretch (no aspect preservation) matches the existing export; a
    /// failure here is logged by the emitter's caller path, never raised.
    fn place_image(&mut self, range: GridRange, image: &DecodedImage) -> Result<(), Self::Error> {
        let (x, y_top) = self.cell_origin(range.first_row, range.first_col);
        let w = self.columns[range.first_col].width_mm - 2.0 * CELL_PAD;
        let h = (range.last_row - range.first_row + 1) as f32 * self.row_h - 2.0 * CELL_PAD;

        let dynamic = match printpdf::image_crate::load_from_memory(&image.bytes) {
            Ok(img) => flatten_alpha(img),
            Err(e) => {
                log::warn!("pdf image re-decode failed: {}", e);
                return Ok(());
            }
        };
        let embedded = printpdf::Image::from_dynamic_image(&dynamic);

        let dpi = 300.0;
        let scale_x = w * dpi / (25.4 * image.width as f32);
        let scale_y = h * dpi / (25.4 * image.height as f32);
        embedded.add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(x + CELL_PAD)),
                translate_y: Some(Mm(y_top - self.row_h * (range.last_row - range.first_row + 1) as f32 + CELL_PAD)),
                scale_x: Some(scale_x),
                scale_y: Some(scale_y),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        Ok(())
    }
}

/// Flatten any alpha channel over white; the PDF stream carries opaque RGB.
fn flatten_alpha(img: printpdf::image_crate::DynamicImage) -> printpdf::image_crate::DynamicImage {
    use printpdf::image_crate::{imageops, DynamicImage, Rgba, RgbaImage};
    if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        let (w, h) = (rgba.width(), rgba.height());
        let mut background = RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255]));
        imageops::overlay(&mut background, &rgba, 0, 0);
        DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(background).to_rgb8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    }
}

/// Left x offset of each column, starting at the page margin.
fn column_offsets(columns: &[ColumnSpec]) -> Vec<f32> {
    let mut xs = Vec::with_capacity(columns.len());
    let mut x = MARGIN;
    for spec in columns {
        xs.push(x);
        x += spec.width_mm;
    }
    xs
}

fn prepare_grid_stroke(layer: &PdfLayerReference) {
    layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    layer.set_outline_thickness(0.2);
}

/// Stroke a cell rectangle whose top edge sits at `y_top`.
fn stroke_rect(layer: &PdfLayerReference, x: f32, y_top: f32, w: f32, h: f32) {
    let points = vec![
        (Point::new(Mm(x), Mm(y_top)), false),
        (Point::new(Mm(x + w), Mm(y_top)), false),
        (Point::new(Mm(x + w), Mm(y_top - h)), false),
        (Point::new(Mm(x), Mm(y_top - h)), false),
    ];
    layer.add_line(Line {
        points,
        is_closed: true,
    });
}

/// Truncate text to what fits the column at the given size. Builtin fonts
/// expose no metrics, so this works off an average glyph width.
fn fit_text(text: &str, width_mm: f32, size_pt: f32) -> String {
    let usable = (width_mm - 2.0 * CELL_PAD).max(1.0);
    let max_chars = (usable / (size_pt * CHAR_WIDTH_EM * PT_TO_MM)).max(1.0) as usize;
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

fn approx_text_width(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * size_pt * CHAR_WIDTH_EM * PT_TO_MM
}

fn centered_x(text: &str, size_pt: f32) -> f32 {
    ((PAGE_W - approx_text_width(text, size_pt)) / 2.0).max(MARGIN)
}

/// Blocks that fit under the column header on page 1 / continuation pages.
/// Exposed for pagination assertions in the integration tests.
pub fn proforma_page_capacities() -> (usize, usize) {
    let block_h = BLOCK_ROW_H * super::plan::ROWS_PER_BLOCK as f32;
    let first = ((FIRST_PAGE_TABLE_TOP - COLUMN_HEADER_H - BOTTOM_LIMIT) / block_h) as usize;
    let cont = ((CONT_PAGE_TABLE_TOP - COLUMN_HEADER_H - BOTTOM_LIMIT) / block_h) as usize;
    (first, cont)
}
