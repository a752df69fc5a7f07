//! Institutional letterhead configuration shared by both export backends.

use chrono::{Datelike, Local};
use std::path::Path;

const INSTITUTION_NAME: &str =
    "R.V. COLLEGE OF ENGINEERING, R.V Vidyaniketan Post, Bangalore - 59";
const INSTITUTION_ADDRESS: &str =
    "R.V Vidyaniketan post, Mysore Road, Bangalore - 560059. Ph: 080-67178055, 67178021 Fax: 08067178011";
const PROFORMA_TITLE: &str =
    "IDENTITY/ELIGIBILITY PROFORMA OF PLAYERS REPRESENTING INTER-COLLEGIATE SPORTS ACTIVITIES";
const FOOTER_CERTIFICATION: &str =
    "Certified that these persons are bonafide students of RVCE, B'lore and the information provided in this format is correct";

/// Static letterhead metadata, read-only for the lifetime of an export.
#[derive(Debug, Clone)]
pub struct LetterheadConfig {
    pub institution_name: String,
    pub institution_address: String,
    pub proforma_title: String,
    /// Certification line printed after the last row block (and on every
    /// PDF page).
    pub footer_certification: String,
    /// Academic year label appended to the proforma title, e.g. `2025-26`.
    pub academic_year: String,
    /// Raw logo image bytes for the letterhead logo cell. `None` renders the
    /// cell empty.
    pub logo: Option<Vec<u8>>,
}

impl Default for LetterheadConfig {
    fn default() -> Self {
        Self {
            institution_name: INSTITUTION_NAME.to_string(),
            institution_address: INSTITUTION_ADDRESS.to_string(),
            proforma_title: PROFORMA_TITLE.to_string(),
            footer_certification: FOOTER_CERTIFICATION.to_string(),
            academic_year: academic_year_label(Local::now().year()),
            logo: None,
        }
    }
}

impl LetterheadConfig {
    /// Attach logo bytes, replacing any previously loaded image.
    pub fn with_logo(mut self, bytes: Vec<u8>) -> Self {
        self.logo = Some(bytes);
        self
    }

    /// Load the bundled logo from the static assets directory if present.
    /// A missing logo file is not an error; the logo cell stays empty.
    pub fn load_default_logo(mut self) -> Self {
        let path = static_dir().join("logo.png");
        match std::fs::read(&path) {
            Ok(bytes) => self.logo = Some(bytes),
            Err(e) => log::debug!("no letterhead logo at {}: {}", path.display(), e),
        }
        self
    }

    /// Proforma title with the academic year suffix, as printed on paper.
    pub fn titled_for_year(&self) -> String {
        format!("{} {}", self.proforma_title, self.academic_year)
    }
}

/// `2025` -> `2025-26`.
pub fn academic_year_label(year: i32) -> String {
    format!("{}-{:02}", year, (year + 1) % 100)
}

/// Static assets directory bundled with the crate.
fn static_dir() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/static"))
}
