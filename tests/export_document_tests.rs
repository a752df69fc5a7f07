use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::NaiveDate;

use rvce_sports_export::export::pdf::proforma_page_capacities;
use rvce_sports_export::export::{
    build_document, export_filename, DocumentFormat, DocumentVariant, ExportError,
};
use rvce_sports_export::letterhead::LetterheadConfig;
use rvce_sports_export::model::{ExportFilter, StudentRecord, SubmissionStatus};

fn record(serial: usize) -> StudentRecord {
    serde_json::from_value(serde_json::json!({
        "id": format!("sub-{serial}"),
        "game_sport_competition": "Basketball",
        "organizing_institution": "VTU",
        "date_of_activity": "2024-06-10",
        "year_of_activity": "2024",
        "student_name": format!("Student {serial}"),
        "parent_name": "Ramesh Rao",
        "semester": "5",
        "branch": "CSE",
        "usn": format!("1RV21CS{:03}", serial),
        "date_of_birth": "2003-01-15",
        "blood_group": "O+",
        "contact_address": "RVCE hostel, Mysore Road, Bangalore",
        "phone": "9876543210",
        "mother_name": "Lakshmi Rao",
        "course_name": "B.E.",
        "passing_year_puc": "2021",
        "date_first_admission_course": "2021-08-01",
        "date_first_admission_class": "2021-08-05",
        "status": "approved"
    }))
    .unwrap()
}

fn tiny_png_base64() -> String {
    let img = image::RgbImage::from_pixel(4, 5, image::Rgb([200, 100, 50]));
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageOutputFormat::Png)
        .unwrap();
    BASE64.encode(buf.into_inner())
}

/// Largest `/Count N` entry in the document, i.e. the page tree total.
fn pdf_page_count(bytes: &[u8]) -> usize {
    let text = String::from_utf8_lossy(bytes);
    text.match_indices("/Count ")
        .filter_map(|(idx, _)| {
            let digits: String = text[idx + 7..]
                .chars()
                .take_while(|c| c.is_ascii_digit())
                .collect();
            digits.parse::<usize>().ok()
        })
        .max()
        .unwrap_or(0)
}

#[test]
fn test_proforma_xlsx_builds_a_zip_container() {
    let bare: Vec<StudentRecord> = (1..=3).map(record).collect();
    let mut records = bare.clone();
    records[0].photo_base64 = Some(format!("data:image/png;base64,{}", tiny_png_base64()));
    records[0].signature_base64 = Some(tiny_png_base64());
    records[1].photo_base64 = Some(tiny_png_base64());

    let document = build_document(
        &records,
        &LetterheadConfig::default(),
        &ExportFilter::default(),
        DocumentVariant::Proforma,
        DocumentFormat::Xlsx,
    )
    .unwrap();

    // XLSX is a zip archive.
    assert_eq!(&document.bytes[..2], b"PK");
    assert!(document.filename.starts_with("RVCE_Proforma_All"));
    assert!(document.filename.ends_with(".xlsx"));

    // The three embedded rasters must actually land in the archive: the
    // same records without payloads serialize measurably smaller.
    let without_images = build_document(
        &bare,
        &LetterheadConfig::default(),
        &ExportFilter::default(),
        DocumentVariant::Proforma,
        DocumentFormat::Xlsx,
    )
    .unwrap();
    assert!(document.bytes.len() > without_images.bytes.len());
}

#[test]
fn test_malformed_image_payload_does_not_fail_the_export() {
    let mut records: Vec<StudentRecord> = (1..=2).map(record).collect();
    records[0].photo_base64 = Some("%%%definitely-not-base64%%%".to_string());
    records[1].signature_base64 = Some(BASE64.encode(b"base64 but not an image"));

    for format in [DocumentFormat::Xlsx, DocumentFormat::Pdf] {
        let result = build_document(
            &records,
            &LetterheadConfig::default(),
            &ExportFilter::default(),
            DocumentVariant::Proforma,
            format,
        );
        assert!(result.is_ok(), "{:?} export must tolerate bad images", format);
    }
}

#[test]
fn test_simple_list_builds_in_both_formats() {
    let records: Vec<StudentRecord> = (1..=10).map(record).collect();
    let filter = ExportFilter {
        sport: Some("Basketball".into()),
        status: Some(SubmissionStatus::Approved),
    };

    let xlsx = build_document(
        &records,
        &LetterheadConfig::default(),
        &filter,
        DocumentVariant::SimpleList,
        DocumentFormat::Xlsx,
    )
    .unwrap();
    assert_eq!(&xlsx.bytes[..2], b"PK");
    assert!(xlsx.filename.starts_with("RVCE_Sports_Basketball_approved_"));

    let pdf = build_document(
        &records,
        &LetterheadConfig::default(),
        &filter,
        DocumentVariant::SimpleList,
        DocumentFormat::Pdf,
    )
    .unwrap();
    assert_eq!(&pdf.bytes[..5], b"%PDF-");
}

#[test]
fn test_large_proforma_pdf_spans_multiple_pages() {
    let (first_page, continuation) = proforma_page_capacities();
    assert!(first_page >= 3);
    assert!(continuation >= first_page);

    let records: Vec<StudentRecord> = (1..=120).map(record).collect();
    assert!(records.len() > first_page + continuation);

    let small = build_document(
        &records[..2],
        &LetterheadConfig::default(),
        &ExportFilter::default(),
        DocumentVariant::Proforma,
        DocumentFormat::Pdf,
    )
    .unwrap();
    let large = build_document(
        &records,
        &LetterheadConfig::default(),
        &ExportFilter::default(),
        DocumentVariant::Proforma,
        DocumentFormat::Pdf,
    )
    .unwrap();

    assert_eq!(&large.bytes[..5], b"%PDF-");
    assert_eq!(pdf_page_count(&small.bytes), 1);

    // Page 1 holds `first_page` blocks, every later page `continuation`.
    let expected_pages = 1 + (records.len() - first_page).div_ceil(continuation);
    assert_eq!(pdf_page_count(&large.bytes), expected_pages);
}

#[test]
fn test_empty_record_set_is_a_no_records_error() {
    let err = build_document(
        &[],
        &LetterheadConfig::default(),
        &ExportFilter::default(),
        DocumentVariant::SimpleList,
        DocumentFormat::Pdf,
    )
    .unwrap_err();
    assert!(matches!(err, ExportError::NoRecords));
}

#[test]
fn test_export_filename_variants() {
    let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();

    let filtered = ExportFilter {
        sport: Some("Basketball".into()),
        status: Some(SubmissionStatus::Approved),
    };
    assert_eq!(
        export_filename(&filtered, DocumentVariant::SimpleList, DocumentFormat::Xlsx, date),
        "RVCE_Sports_Basketball_approved_2024-05-01.xlsx"
    );

    let pending_only = ExportFilter {
        sport: None,
        status: Some(SubmissionStatus::Pending),
    };
    assert_eq!(
        export_filename(&pending_only, DocumentVariant::SimpleList, DocumentFormat::Pdf, date),
        "RVCE_Sports_All_pending_2024-05-01.pdf"
    );

    assert_eq!(
        export_filename(&pending_only, DocumentVariant::Proforma, DocumentFormat::Pdf, date),
        "RVCE_Proforma_All.pdf"
    );
}

#[test]
fn test_logo_letterhead_still_builds_workbook() {
    let logo = {
        let img = image::RgbImage::from_pixel(32, 32, image::Rgb([0, 0, 128]));
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut buf, image::ImageOutputFormat::Png)
            .unwrap();
        buf.into_inner()
    };
    let config = LetterheadConfig::default().with_logo(logo);
    let records: Vec<StudentRecord> = (1..=1).map(record).collect();

    let document = build_document(
        &records,
        &config,
        &ExportFilter::default(),
        DocumentVariant::Proforma,
        DocumentFormat::Xlsx,
    )
    .unwrap();
    assert_eq!(&document.bytes[..2], b"PK");
}
