//! Spreadsheet backend adapter.
//!
//! Realizes a `DocumentPlan` as a single-worksheet workbook and returns the
//! serialized buffer. Geometry follows the paper proforma: four letterhead
//! rows, one column-header row, then five physical rows per student with
//! vertical merges and floating photo/signature images anchored to the
//! merged cell regions.

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Image, Workbook, Worksheet, XlsxError};

use super::images::DecodedImage;
use super::plan::{
    BodyPlan, DocumentPlan, ROWS_PER_BLOCK, PROFORMA_COLUMNS, SIMPLE_XLSX_COLUMNS,
};
use super::sink::{emit_row_blocks, BodyCell, GridRange, TableSink};

/// First body row of the proforma sheet (0-based): rows 0-3 letterhead,
/// row 4 column headers.
const PROFORMA_BODY_ORIGIN: u32 = 5;
/// Height of each physical body row, points.
const BODY_ROW_HEIGHT: f64 = 24.0;

struct Formats {
    title: Format,
    subtitle: Format,
    filter: Format,
    col_header: Format,
    merged_value: Format,
    label: Format,
    footer: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            title: Format::new()
                .set_bold()
                .set_font_size(14.0)
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_text_wrap(),
            subtitle: Format::new()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_text_wrap(),
            filter: Format::new().set_bold().set_align(FormatAlign::Left),
            col_header: Format::new()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_text_wrap()
                .set_border(FormatBorder::Thin),
            merged_value: Format::new()
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_text_wrap()
                .set_border(FormatBorder::Thin),
            label: Format::new()
                .set_align(FormatAlign::Left)
                .set_align(FormatAlign::VerticalCenter)
                .set_text_wrap()
                .set_indent(1)
                .set_border(FormatBorder::Thin),
            footer: Format::new()
                .set_italic()
                .set_align(FormatAlign::Center)
                .set_border_top(FormatBorder::Thin),
        }
    }
}

/// Build the workbook for a plan and serialize it to an in-memory buffer.
pub fn build_workbook(plan: &DocumentPlan<'_>, logo: Option<&[u8]>) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let formats = Formats::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Students")?;

    match &plan.body {
        BodyPlan::Blocks(blocks) => {
            write_proforma(worksheet, plan, blocks.len(), logo, &formats)?;
            let mut sink = WorksheetSink {
                worksheet,
                origin: PROFORMA_BODY_ORIGIN,
                formats: &formats,
            };
            emit_row_blocks(blocks, &mut sink)?;
        }
        BodyPlan::Rows(_) => write_simple_list(worksheet, plan, &formats)?,
    }

    workbook.save_to_buffer()
}

/// Letterhead rows 1-4, column header row 5, body row heights and footer of
/// the proforma sheet. The row blocks themselves go through the sink.
fn write_proforma(
    worksheet: &mut Worksheet,
    plan: &DocumentPlan<'_>,
    block_count: usize,
    logo: Option<&[u8]>,
    formats: &Formats,
) -> Result<(), XlsxError> {
    for (idx, spec) in PROFORMA_COLUMNS.iter().enumerate() {
        worksheet.set_column_width(idx as u16, spec.width_chars)?;
    }

    // Rows 1-3: logo cell A1:B3 beside the merged letterhead text C1:I1..C3:I3.
    worksheet.merge_range(0, 0, 2, 1, "", &formats.subtitle)?;
    if let Some(bytes) = logo {
        match Image::new_from_buffer(bytes) {
            Ok(mut image) => {
                // Fit the logo to the three header rows, keeping its aspect.
                let region_h_px = 3.0 * 15.0 * 4.0 / 3.0;
                let scale = region_h_px / image.height();
                image.set_scale_width(scale).set_scale_height(scale);
                worksheet.insert_image(0, 0, &image)?;
            }
            Err(e) => log::warn!("skipping letterhead logo: {}", e),
        }
    }
    worksheet.merge_range(0, 2, 0, 8, &plan.header.institution_name, &formats.title)?;
    worksheet.merge_range(1, 2, 1, 8, &plan.header.institution_address, &formats.subtitle)?;
    worksheet.merge_range(2, 2, 2, 8, &plan.header.title_line, &formats.subtitle)?;

    // Row 4: sport filter, organizing institution, export date.
    worksheet.merge_range(3, 0, 3, 2, &plan.header.filter_line, &formats.filter)?;
    worksheet.merge_range(3, 3, 3, 5, &plan.header.organizing_institution, &formats.filter)?;
    worksheet.merge_range(3, 6, 3, 8, &plan.header.date_line, &formats.filter)?;

    // Row 5: column headers.
    for (idx, spec) in PROFORMA_COLUMNS.iter().enumerate() {
        worksheet.write_with_format(4, idx as u16, spec.title, &formats.col_header)?;
    }

    let body_rows = block_count * ROWS_PER_BLOCK;
    for offset in 0..body_rows {
        worksheet.set_row_height(PROFORMA_BODY_ORIGIN + offset as u32, BODY_ROW_HEIGHT)?;
    }

    // Footer immediately after the last block, top border only.
    let footer_row = PROFORMA_BODY_ORIGIN + body_rows as u32;
    worksheet.merge_range(footer_row, 0, footer_row, 8, &plan.footer, &formats.footer)?;

    Ok(())
}

/// The flat listing sheet: merged letterhead, filter/date line, bold header
/// row, one bordered row per record, merged italic footer.
fn write_simple_list(
    worksheet: &mut Worksheet,
    plan: &DocumentPlan<'_>,
    formats: &Formats,
) -> Result<(), XlsxError> {
    let rows = match &plan.body {
        BodyPlan::Rows(rows) => rows,
        _ => unreachable!("simple list plan carries rows"),
    };
    let last_col = (SIMPLE_XLSX_COLUMNS.len() - 1) as u16;

    for (idx, spec) in SIMPLE_XLSX_COLUMNS.iter().enumerate() {
        worksheet.set_column_width(idx as u16, spec.width_chars)?;
    }

    worksheet.merge_range(0, 0, 0, last_col, &plan.header.institution_name, &formats.title)?;
    worksheet.merge_range(1, 0, 1, last_col, &plan.header.institution_address, &formats.subtitle)?;
    worksheet.merge_range(2, 0, 2, last_col, &plan.header.title_line, &formats.subtitle)?;

    worksheet.write_with_format(4, 0, plan.header.filter_line.as_str(), &formats.filter)?;
    worksheet.write_with_format(4, 3, plan.header.date_line.as_str(), &formats.filter)?;

    for (idx, spec) in SIMPLE_XLSX_COLUMNS.iter().enumerate() {
        worksheet.write_with_format(6, idx as u16, spec.title, &formats.col_header)?;
    }

    let mut row = 7u32;
    for list_row in rows {
        for (idx, cell) in list_row.xlsx_cells().iter().enumerate() {
            worksheet.write_with_format(row, idx as u16, cell.as_str(), &formats.label)?;
        }
        row += 1;
    }

    // Blank spacer row, then the certification footer.
    worksheet.merge_range(row + 1, 0, row + 1, last_col, &plan.footer, &formats.footer)?;

    Ok(())
}

/// `TableSink` over a worksheet, offset to the proforma body origin.
struct WorksheetSink<'a> {
    worksheet: &'a mut Worksheet,
    origin: u32,
    formats: &'a Formats,
}

impl<'a> WorksheetSink<'a> {
    // Resolves through `self.formats: &'a Formats` so the returned borrow is
    // independent of `&self` and the worksheet stays mutably borrowable.
    fn format_for(&self, style: BodyCell) -> &'a Format {
        match style {
            BodyCell::Merged => &self.formats.merged_value,
            BodyCell::Label => &self.formats.label,
        }
    }
}

impl TableSink for WorksheetSink<'_> {
    type Error = XlsxError;

    fn merge_cells(
        &mut self,
        range: GridRange,
        text: &str,
        style: BodyCell,
    ) -> Result<(), Self::Error> {
        self.worksheet.merge_range(
            self.origin + range.first_row as u32,
            range.first_col as u16,
            self.origin + range.last_row as u32,
            range.last_col as u16,
            text,
            self.format_for(style),
        )?;
        Ok(())
    }

    fn set_cell_text(
        &mut self,
        row: usize,
        col: usize,
        text: &str,
        style: BodyCell,
    ) -> Result<(), Self::Error> {
        self.worksheet.write_with_format(
            self.origin + row as u32,
            col as u16,
            text,
            self.format_for(style),
        )?;
        Ok(())
    }

    fn place_image(&mut self, range: GridRange, image: &DecodedImage) -> Result<(), Self::Error> {
        let mut embedded = Image::new_from_buffer(&image.bytes)?;

        // Stretch to the merged region's pixel extents; aspect ratio is
        // deliberately not preserved (existing export behavior).
        let target_w = column_width_px(range.first_col);
        let target_h =
            (range.last_row - range.first_row + 1) as f64 * BODY_ROW_HEIGHT * 4.0 / 3.0;
        embedded
            .set_scale_width(target_w / image.width as f64)
            .set_scale_height(target_h / image.height as f64);

        self.worksheet.insert_image(
            self.origin + range.first_row as u32,
            range.first_col as u16,
            &embedded,
        )?;
        Ok(())
    }
}

/// Approximate pixel width of a proforma column (Excel's character-width
/// to pixel rule of thumb).
fn column_width_px(col: usize) -> f64 {
    PROFORMA_COLUMNS[col].width_chars * 7.0 + 5.0
}
