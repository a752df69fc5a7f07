use rvce_sports_export::export::plan::{
    plan_document, BodyPlan, DocumentVariant, PROFORMA_COLUMNS, ROWS_PER_BLOCK,
    SIMPLE_PDF_COLUMNS, SIMPLE_XLSX_COLUMNS,
};
use rvce_sports_export::letterhead::LetterheadConfig;
use rvce_sports_export::model::{ExportFilter, StudentRecord};

fn record() -> StudentRecord {
    serde_json::from_value(serde_json::json!({
        "id": "sub-1",
        "game_sport_competition": "Kabaddi",
        "organizing_institution": "VTU",
        "date_of_activity": "2024-06-10",
        "year_of_activity": "2024",
        "student_name": "Asha Rao",
        "parent_name": "Ramesh Rao",
        "semester": "5",
        "branch": "CSE",
        "usn": "1RV21CS001",
        "date_of_birth": "2003-01-15",
        "blood_group": "O+",
        "contact_address": "Bangalore",
        "phone": "9876543210",
        "mother_name": "Lakshmi Rao",
        "course_name": "B.E.",
        "passing_year_puc": "2021",
        "date_first_admission_course": "2021-08-01",
        "date_first_admission_class": "2021-08-05",
        "previous_game": "Kabaddi",
        "previous_years": "2022, 2023",
        "status": "approved"
    }))
    .unwrap()
}

#[test]
fn test_proforma_column_order_and_merge_flags() {
    let titles: Vec<&str> = PROFORMA_COLUMNS.iter().map(|c| c.title).collect();
    assert_eq!(
        titles,
        vec![
            "Sl.No",
            "Student Details",
            "Date of Birth",
            "Contact Details",
            "Course",
            "Academic Details",
            "Previous Participation",
            "Photo",
            "Signature",
        ]
    );

    // Single-value and image columns span the whole block; the lettered
    // label columns do not.
    let merged: Vec<bool> = PROFORMA_COLUMNS.iter().map(|c| c.merged).collect();
    assert_eq!(
        merged,
        vec![true, false, true, false, true, false, false, true, true]
    );
}

#[test]
fn test_row_block_sub_line_lettering() {
    assert_eq!(ROWS_PER_BLOCK, 5);

    let records = vec![record()];
    let plan = plan_document(
        &records,
        &LetterheadConfig::default(),
        &ExportFilter::default(),
        DocumentVariant::Proforma,
    );
    let blocks = match &plan.body {
        BodyPlan::Blocks(blocks) => blocks,
        BodyPlan::Rows(_) => panic!("proforma plan must produce blocks"),
    };

    let block = &blocks[0];
    assert_eq!(block.student_lines[0], "a) Asha Rao");
    assert_eq!(block.student_lines[1], "b) S/o, D/o Ramesh Rao");
    assert_eq!(block.student_lines[4], "e) USN: 1RV21CS001");
    assert_eq!(block.contact_lines[0], "a) Blood Grp: O+");
    assert_eq!(block.contact_lines[3], "d) Mother: Lakshmi Rao");
    assert_eq!(block.academic_lines[0], "a) PUC passed: 2021");
    assert_eq!(block.previous_lines[1], "b) Years: 2022, 2023");
    assert_eq!(block.dob, "2003-01-15");
    assert_eq!(block.course, "B.E.");
}

#[test]
fn test_pdf_column_widths_fill_the_landscape_page() {
    // A4 landscape is 297mm with a 10mm margin either side.
    let proforma: f32 = PROFORMA_COLUMNS.iter().map(|c| c.width_mm).sum();
    assert!((proforma - 277.0).abs() < 1e-3);

    let list: f32 = SIMPLE_PDF_COLUMNS.iter().map(|c| c.width_mm).sum();
    assert!((list - 277.0).abs() < 1e-3);
}

#[test]
fn test_simple_list_column_count_matches_cells() {
    let records = vec![record()];
    let plan = plan_document(
        &records,
        &LetterheadConfig::default(),
        &ExportFilter::default(),
        DocumentVariant::SimpleList,
    );
    let rows = match &plan.body {
        BodyPlan::Rows(rows) => rows,
        BodyPlan::Blocks(_) => panic!("list plan must produce rows"),
    };
    assert_eq!(rows[0].xlsx_cells().len(), SIMPLE_XLSX_COLUMNS.len());
    assert_eq!(rows[0].pdf_cells().len(), SIMPLE_PDF_COLUMNS.len());
}
