//! Layout Planner: turns an ordered record set into a backend-neutral
//! document plan.
//!
//! The planner is a pure function over its inputs (save for the printed
//! export date). It never touches a document library; the spreadsheet and
//! PDF adapters realize the same `DocumentPlan` through their own geometry.

use chrono::Local;

use crate::letterhead::LetterheadConfig;
use crate::model::{ExportFilter, StudentRecord};

/// Physical rows each proforma record occupies in the document body.
pub const ROWS_PER_BLOCK: usize = 5;

/// Which document layout the plan targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentVariant {
    /// Flat one-row-per-student listing with the college letterhead.
    SimpleList,
    /// The official 9-column, 5-row-per-student eligibility proforma.
    Proforma,
}

/// What a label column prints when the source field is absent or empty.
///
/// Identity and academic fields keep a literal `-` so the printed form still
/// reads positionally; free-text contact fields stay blank. This is the
/// explicit substitution policy the ad-hoc `|| '-'` / `|| ''` defaults in the
/// legacy exports collapsed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    Dash,
    Blank,
}

/// Apply the substitution policy to a possibly-empty field.
pub fn substitute(value: &str, policy: MissingPolicy) -> String {
    let trimmed = value.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    match policy {
        MissingPolicy::Dash => "-".to_string(),
        MissingPolicy::Blank => String::new(),
    }
}

fn substitute_opt(value: Option<&str>, policy: MissingPolicy) -> String {
    substitute(value.unwrap_or(""), policy)
}

/// Static description of one logical column: header label plus width hints
/// for each backend (characters for the worksheet, millimetres for the PDF).
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub title: &'static str,
    pub width_chars: f64,
    pub width_mm: f32,
    /// Vertically merged across all five rows of a proforma block.
    pub merged: bool,
}

const fn col(title: &'static str, width_chars: f64, width_mm: f32, merged: bool) -> ColumnSpec {
    ColumnSpec {
        title,
        width_chars,
        width_mm,
        merged,
    }
}

/// The fixed 9-column proforma layout. Order is load-bearing: backends index
/// into this table positionally.
pub const PROFORMA_COLUMNS: [ColumnSpec; 9] = [
    col("Sl.No", 6.0, 12.0, true),
    col("Student Details", 28.0, 56.0, false),
    col("Date of Birth", 12.0, 22.0, true),
    col("Contact Details", 28.0, 56.0, false),
    col("Course", 12.0, 24.0, true),
    col("Academic Details", 22.0, 40.0, false),
    col("Previous Participation", 18.0, 27.0, false),
    col("Photo", 14.0, 20.0, true),
    col("Signature", 14.0, 20.0, true),
];

/// Columns of the flat spreadsheet listing.
pub const SIMPLE_XLSX_COLUMNS: [ColumnSpec; 14] = [
    col("Sl.No", 6.0, 0.0, false),
    col("Name of Student", 20.0, 0.0, false),
    col("S/o, D/o", 15.0, 0.0, false),
    col("Semester", 8.0, 0.0, false),
    col("Branch", 10.0, 0.0, false),
    col("USN No.", 15.0, 0.0, false),
    col("Date of Birth", 12.0, 0.0, false),
    col("Blood Group", 8.0, 0.0, false),
    col("Contact Address", 25.0, 0.0, false),
    col("Phone/Cell No.", 12.0, 0.0, false),
    col("Mother Name", 15.0, 0.0, false),
    col("Course Name", 12.0, 0.0, false),
    col("Game/Sport", 15.0, 0.0, false),
    col("Status", 10.0, 0.0, false),
];

/// Abbreviated columns of the flat PDF listing (landscape width budget).
pub const SIMPLE_PDF_COLUMNS: [ColumnSpec; 11] = [
    col("Sl.No", 0.0, 12.0, false),
    col("Name of Student", 0.0, 45.0, false),
    col("S/o, D/o", 0.0, 35.0, false),
    col("Sem", 0.0, 12.0, false),
    col("Branch", 0.0, 22.0, false),
    col("USN No.", 0.0, 28.0, false),
    col("DOB", 0.0, 22.0, false),
    col("Blood", 0.0, 16.0, false),
    col("Phone", 0.0, 26.0, false),
    col("Sport", 0.0, 34.0, false),
    col("Status", 0.0, 25.0, false),
];

/// Letterhead and filter lines rendered above the table body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderBlock {
    pub institution_name: String,
    pub institution_address: String,
    /// Proforma title with the academic-year suffix.
    pub title_line: String,
    /// `Game/Sport/Competition: <sport or All Sports>`
    pub filter_line: String,
    /// Organizing institution of the filtered records, `-` when unknown.
    pub organizing_institution: String,
    /// `Date: <dd/mm/yyyy>` — wall clock, excluded from purity comparisons.
    pub date_line: String,
}

/// The five logical text rows of one student's proforma block, plus borrowed
/// image payloads. Recomputed fresh per export and discarded after emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowBlock<'a> {
    /// 1-based position in the input sequence, never the stored `sln`.
    pub serial: String,
    pub student_lines: [String; ROWS_PER_BLOCK],
    pub dob: String,
    pub contact_lines: [String; ROWS_PER_BLOCK],
    pub course: String,
    pub academic_lines: [String; ROWS_PER_BLOCK],
    pub previous_lines: [String; ROWS_PER_BLOCK],
    pub photo: Option<&'a str>,
    pub signature: Option<&'a str>,
}

/// One flat listing row, borrowing its record.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRow<'a> {
    pub serial: usize,
    pub record: &'a StudentRecord,
}

impl<'a> ListRow<'a> {
    /// Cell texts for the 14-column spreadsheet listing.
    pub fn xlsx_cells(&self) -> [String; 14] {
        let r = self.record;
        [
            self.serial.to_string(),
            substitute(&r.student_name, MissingPolicy::Dash),
            substitute(&r.parent_name, MissingPolicy::Dash),
            substitute(&r.semester, MissingPolicy::Dash),
            substitute(&r.branch, MissingPolicy::Dash),
            substitute(&r.usn, MissingPolicy::Dash),
            substitute(&r.date_of_birth, MissingPolicy::Dash),
            substitute(&r.blood_group, MissingPolicy::Dash),
            substitute(&r.contact_address, MissingPolicy::Blank),
            substitute(&r.phone, MissingPolicy::Dash),
            substitute(&r.mother_name, MissingPolicy::Dash),
            substitute(&r.course_name, MissingPolicy::Dash),
            substitute(&r.game_sport_competition, MissingPolicy::Dash),
            r.status.as_str().to_string(),
        ]
    }

    /// Cell texts for the 11-column PDF listing.
    pub fn pdf_cells(&self) -> [String; 11] {
        let r = self.record;
        [
            self.serial.to_string(),
            substitute(&r.student_name, MissingPolicy::Dash),
            substitute(&r.parent_name, MissingPolicy::Dash),
            substitute(&r.semester, MissingPolicy::Dash),
            substitute(&r.branch, MissingPolicy::Dash),
            substitute(&r.usn, MissingPolicy::Dash),
            substitute(&r.date_of_birth, MissingPolicy::Dash),
            substitute(&r.blood_group, MissingPolicy::Dash),
            substitute(&r.phone, MissingPolicy::Dash),
            substitute(&r.game_sport_competition, MissingPolicy::Dash),
            r.status.as_str().to_uppercase(),
        ]
    }
}

/// Body of the plan, shaped by the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum BodyPlan<'a> {
    Blocks(Vec<RowBlock<'a>>),
    Rows(Vec<ListRow<'a>>),
}

impl BodyPlan<'_> {
    pub fn len(&self) -> usize {
        match self {
            BodyPlan::Blocks(b) => b.len(),
            BodyPlan::Rows(r) => r.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Header + ordered body + footer, ready for either backend adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentPlan<'a> {
    pub variant: DocumentVariant,
    pub header: HeaderBlock,
    pub body: BodyPlan<'a>,
    pub footer: String,
}

/// Build the document plan for the given records and variant.
///
/// Records must already be filtered and ordered by the caller; serial numbers
/// are positional. Empty input yields a valid header+footer-only plan.
pub fn plan_document<'a>(
    records: &'a [StudentRecord],
    config: &LetterheadConfig,
    filter: &ExportFilter,
    variant: DocumentVariant,
) -> DocumentPlan<'a> {
    let organizing = records
        .first()
        .map(|r| substitute(&r.organizing_institution, MissingPolicy::Dash))
        .unwrap_or_else(|| "-".to_string());

    let header = HeaderBlock {
        institution_name: config.institution_name.clone(),
        institution_address: config.institution_address.clone(),
        title_line: config.titled_for_year(),
        filter_line: format!("Game/Sport/Competition: {}", filter.sport_label()),
        organizing_institution: format!("Organizing Institution: {}", organizing),
        date_line: format!("Date: {}", Local::now().format("%d/%m/%Y")),
    };

    let body = match variant {
        DocumentVariant::Proforma => BodyPlan::Blocks(
            records
                .iter()
                .enumerate()
                .map(|(i, r)| row_block(i + 1, r))
                .collect(),
        ),
        DocumentVariant::SimpleList => BodyPlan::Rows(
            records
                .iter()
                .enumerate()
                .map(|(i, record)| ListRow {
                    serial: i + 1,
                    record,
                })
                .collect(),
        ),
    };

    DocumentPlan {
        variant,
        header,
        body,
        footer: config.footer_certification.clone(),
    }
}

/// Map one record onto its five proforma rows. The mapping is positional and
/// total: every sub-line exists even when the source field is absent.
fn row_block(serial: usize, r: &StudentRecord) -> RowBlock<'_> {
    let dash = MissingPolicy::Dash;

    let student_lines = [
        format!("a) {}", substitute(&r.student_name, dash)),
        format!("b) S/o, D/o {}", substitute(&r.parent_name, dash)),
        format!("c) Sem: {}", substitute(&r.semester, dash)),
        format!("d) Branch: {}", substitute(&r.branch, dash)),
        format!("e) USN: {}", substitute(&r.usn, dash)),
    ];

    let contact_lines = [
        format!("a) Blood Grp: {}", substitute(&r.blood_group, dash)),
        format!(
            "b) {}",
            substitute(&r.contact_address, MissingPolicy::Blank)
        ),
        format!("c) Ph: {}", substitute(&r.phone, dash)),
        format!("d) Mother: {}", substitute(&r.mother_name, dash)),
        String::new(),
    ];

    let academic_lines = [
        format!("a) PUC passed: {}", substitute(&r.passing_year_puc, dash)),
        format!(
            "b) Adm. course: {}",
            substitute(&r.date_first_admission_course, dash)
        ),
        format!(
            "c) Adm. class: {}",
            substitute(&r.date_first_admission_class, dash)
        ),
        String::new(),
        String::new(),
    ];

    let previous_lines = [
        format!(
            "a) Game: {}",
            substitute_opt(r.previous_game.as_deref(), dash)
        ),
        format!(
            "b) Years: {}",
            substitute_opt(r.previous_years.as_deref(), dash)
        ),
        String::new(),
        String::new(),
        String::new(),
    ];

    RowBlock {
        serial: serial.to_string(),
        student_lines,
        dob: substitute(&r.date_of_birth, dash),
        contact_lines,
        course: substitute(&r.course_name, dash),
        academic_lines,
        previous_lines,
        photo: r.photo_base64.as_deref(),
        signature: r.signature_base64.as_deref(),
    }
}
