//! Proforma document builder.
//!
//! One Layout Planner feeds two backend adapters:
//! - `excel` realizes a plan as a spreadsheet workbook,
//! - `pdf` realizes the same plan as a paginated landscape table,
//! with `images` handling base64 photo/signature payloads for both and
//! `sink` keeping library-specific merge/anchor idioms out of the planner.

pub mod excel;
pub mod images;
pub mod plan;
pub mod pdf;
pub mod sink;

pub use plan::{plan_document, DocumentPlan, DocumentVariant};

use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::letterhead::LetterheadConfig;
use crate::model::{ExportFilter, StudentRecord};

/// Errors fatal to a single export attempt. Per-image problems never reach
/// this level; they are logged and skipped inside the backends.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no records to export")]
    NoRecords,
    #[error("workbook generation failed: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
    #[error("PDF generation failed: {0}")]
    Pdf(#[from] printpdf::Error),
    #[error("PDF buffer finalization failed: {0}")]
    PdfBuffer(#[source] std::io::Error),
}

/// Output container format of an export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Xlsx,
    Pdf,
}

impl DocumentFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Xlsx => "xlsx",
            DocumentFormat::Pdf => "pdf",
        }
    }
}

/// Result of a successful export: the deterministic download filename and
/// the fully assembled document bytes.
#[derive(Debug)]
pub struct GeneratedDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Build one document for an already-filtered, already-ordered record set.
///
/// The empty-input guard lives here, at the export-trigger boundary; the
/// planner itself tolerates empty input.
pub fn build_document(
    records: &[StudentRecord],
    config: &LetterheadConfig,
    filter: &ExportFilter,
    variant: DocumentVariant,
    format: DocumentFormat,
) -> Result<GeneratedDocument, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoRecords);
    }

    let plan = plan_document(records, config, filter, variant);
    let bytes = match format {
        DocumentFormat::Xlsx => excel::build_workbook(&plan, config.logo.as_deref())?,
        DocumentFormat::Pdf => pdf::build_pdf(&plan)?,
    };

    log::info!(
        "built {} {:?} export: {} records, {} bytes",
        format.extension(),
        variant,
        records.len(),
        bytes.len()
    );

    Ok(GeneratedDocument {
        filename: export_filename(filter, variant, format, Local::now().date_naive()),
        bytes,
    })
}

/// Deterministic, filter-derived filename.
///
/// `RVCE_Sports_<sportOrAll>_<statusOrAll>_<ISODate>.<ext>` for the flat
/// listing, `RVCE_Proforma_<sportOrAll>.<ext>` for the letterhead proforma.
pub fn export_filename(
    filter: &ExportFilter,
    variant: DocumentVariant,
    format: DocumentFormat,
    date: NaiveDate,
) -> String {
    let sport = filter
        .sport
        .as_deref()
        .map(filename_segment)
        .unwrap_or_else(|| "All".to_string());

    match variant {
        DocumentVariant::SimpleList => {
            let status = filter
                .status
                .map(|s| s.as_str().to_string())
                .unwrap_or_else(|| "All".to_string());
            format!(
                "RVCE_Sports_{}_{}_{}.{}",
                sport,
                status,
                date.format("%Y-%m-%d"),
                format.extension()
            )
        }
        DocumentVariant::Proforma => {
            format!("RVCE_Proforma_{}.{}", sport, format.extension())
        }
    }
}

/// Sanitize a sport name for use as a filename segment. Keeps case, maps
/// whitespace runs to a single dash, drops everything else non-alphanumeric.
fn filename_segment(name: &str) -> String {
    let mut result = String::new();
    let mut last_dash = false;
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            result.push(ch);
            last_dash = false;
        } else if (ch.is_whitespace() || ch == '-' || ch == '_') && !last_dash && !result.is_empty()
        {
            result.push('-');
            last_dash = true;
        }
    }
    let trimmed = result.trim_matches('-');
    if trimmed.is_empty() {
        "All".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SubmissionStatus;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    #[test]
    fn list_filename_carries_sport_status_and_iso_date() {
        let filter = ExportFilter {
            sport: Some("Basketball".into()),
            status: Some(SubmissionStatus::Approved),
        };
        assert_eq!(
            export_filename(&filter, DocumentVariant::SimpleList, DocumentFormat::Xlsx, date()),
            "RVCE_Sports_Basketball_approved_2024-05-01.xlsx"
        );
    }

    #[test]
    fn missing_sport_substitutes_all() {
        let filter = ExportFilter {
            sport: None,
            status: Some(SubmissionStatus::Pending),
        };
        assert_eq!(
            export_filename(&filter, DocumentVariant::SimpleList, DocumentFormat::Pdf, date()),
            "RVCE_Sports_All_pending_2024-05-01.pdf"
        );
    }

    #[test]
    fn proforma_filename_has_no_status_or_date_segment() {
        let filter = ExportFilter {
            sport: Some("Table Tennis".into()),
            status: Some(SubmissionStatus::Approved),
        };
        assert_eq!(
            export_filename(&filter, DocumentVariant::Proforma, DocumentFormat::Xlsx, date()),
            "RVCE_Proforma_Table-Tennis.xlsx"
        );
    }

    #[test]
    fn filename_segment_survives_hostile_input() {
        assert_eq!(filename_segment("  Kho  Kho  "), "Kho-Kho");
        assert_eq!(filename_segment("///"), "All");
        assert_eq!(filename_segment("a/b"), "ab");
    }

    #[test]
    fn empty_record_set_is_rejected_before_building() {
        let err = build_document(
            &[],
            &LetterheadConfig::default(),
            &ExportFilter::default(),
            DocumentVariant::Proforma,
            DocumentFormat::Xlsx,
        )
        .unwrap_err();
        assert!(matches!(err, ExportError::NoRecords));
    }
}
