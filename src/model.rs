//! Wire types for the submissions API and the export filter.
//!
//! These mirror the backend's submission schema field for field; the builder
//! treats every record as read-only input.

use serde::{Deserialize, Serialize};

/// Review status of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Approved,
    Rejected,
}

impl SubmissionStatus {
    /// Lowercase form used in query strings and filename segments.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Approved => "approved",
            SubmissionStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One student submission as returned by the listing endpoint.
///
/// `photo_base64` / `signature_base64` are optionally data-URI-prefixed
/// base64 payloads; size is bounded upstream and not re-validated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: String,
    /// Backend-assigned list number, display-only. Distinct from the
    /// export's own positional Sl.No.
    #[serde(default)]
    pub sln: Option<i64>,

    pub game_sport_competition: String,
    pub organizing_institution: String,
    pub date_of_activity: String,
    pub year_of_activity: String,

    pub student_name: String,
    pub parent_name: String,
    pub semester: String,
    pub branch: String,
    pub usn: String,
    pub date_of_birth: String,

    pub blood_group: String,
    pub contact_address: String,
    pub phone: String,
    pub mother_name: String,

    pub course_name: String,
    pub passing_year_puc: String,
    pub date_first_admission_course: String,
    pub date_first_admission_class: String,

    #[serde(default)]
    pub previous_game: Option<String>,
    #[serde(default)]
    pub previous_years: Option<String>,

    #[serde(default)]
    pub photo_base64: Option<String>,
    #[serde(default)]
    pub signature_base64: Option<String>,

    pub status: SubmissionStatus,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

/// Paged listing response from `GET /submissions`.
#[derive(Debug, Deserialize)]
pub struct SubmissionListResponse {
    pub submissions: Vec<StudentRecord>,
    pub total: i64,
    #[serde(default)]
    pub page: Option<i64>,
    #[serde(default)]
    pub per_page: Option<i64>,
}

/// Response of the distinct-sports endpoint, `GET /submissions/sports`.
#[derive(Debug, Deserialize)]
pub struct SportsListResponse {
    pub sports: Vec<String>,
}

/// Filter the caller applied before invoking the builder. Only used for the
/// header filter line and the deterministic filename.
#[derive(Debug, Clone, Default)]
pub struct ExportFilter {
    pub sport: Option<String>,
    pub status: Option<SubmissionStatus>,
}

impl ExportFilter {
    /// Sport label for the document header, `All Sports` when unfiltered.
    pub fn sport_label(&self) -> &str {
        self.sport.as_deref().unwrap_or("All Sports")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_roundtrips_through_lowercase_json() {
        let s: SubmissionStatus = serde_json::from_str("\"approved\"").unwrap();
        assert_eq!(s, SubmissionStatus::Approved);
        assert_eq!(serde_json::to_string(&s).unwrap(), "\"approved\"");
        assert_eq!(s.to_string(), "approved");
    }

    #[test]
    fn sports_list_response_deserializes() {
        let body: SportsListResponse =
            serde_json::from_str(r#"{"sports": ["Basketball", "Kabaddi"]}"#).unwrap();
        assert_eq!(body.sports, vec!["Basketball", "Kabaddi"]);
    }

    #[test]
    fn record_deserializes_with_optional_fields_absent() {
        let json = r#"{
            "id": "abc123",
            "game_sport_competition": "Basketball",
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
            "status": "pending"
        }"#;

        let rec: StudentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(rec.usn, "1RV21CS001");
        assert!(rec.sln.is_none());
        assert!(rec.photo_base64.is_none());
        assert!(rec.previous_game.is_none());
    }
}
