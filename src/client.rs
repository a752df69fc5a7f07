//! HTTP client for the submissions API.
//!
//! The listing endpoint is paged; [`SubmissionsClient::fetch_all_submissions`]
//! walks every page up front so the export builder works on a complete,
//! in-memory record set.

use std::env;

use thiserror::Error;

use crate::model::{ExportFilter, SportsListResponse, StudentRecord, SubmissionListResponse};

const PER_PAGE: usize = 100;
// Hard stop for runaway pagination; at 100 records a page this already
// covers 5000 submissions.
const MAX_PAGES: usize = 50;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("SPORTS_API_BASE_URL must be set")]
    MissingBaseUrl,
    #[error("submissions request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Thin wrapper around `reqwest` bound to one API base URL.
pub struct SubmissionsClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl SubmissionsClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .pool_idle_timeout(std::time::Duration::from_secs(900))
            .user_agent("rvce-sports-export/0.4")
            .build()?;

        Ok(SubmissionsClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Build a client from `SPORTS_API_BASE_URL` and the optional
    /// `SPORTS_API_TOKEN` bearer token.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = env::var("SPORTS_API_BASE_URL").map_err(|_| ClientError::MissingBaseUrl)?;
        let token = env::var("SPORTS_API_TOKEN").ok();
        Self::new(base_url, token)
    }

    /// Fetch every submission matching the filter.
    ///
    /// The status filter is pushed to the server; the sport filter is applied
    /// client-side because the listing endpoint does not support it.
    pub async fn fetch_all_submissions(
        &self,
        filter: &ExportFilter,
    ) -> Result<Vec<StudentRecord>, ClientError> {
        let mut records = Vec::new();
        let mut page = 1usize;

        loop {
            let body = self.fetch_page(page, filter).await?;
            let fetched = body.submissions.len();
            records.extend(body.submissions);

            log::debug!(
                "submissions page {}: {} records ({} so far, total reported {})",
                page,
                fetched,
                records.len(),
                body.total
            );

            if fetched < PER_PAGE {
                break;
            }
            if page >= MAX_PAGES {
                log::warn!(
                    "stopping submissions fetch at page cap {}; export may be truncated",
                    MAX_PAGES
                );
                break;
            }
            page += 1;
        }

        if let Some(sport) = filter.sport.as_deref() {
            retain_sport(&mut records, sport);
        }

        Ok(records)
    }

    /// Fetch the distinct sport names from the dedicated listing endpoint.
    ///
    /// When the endpoint is unavailable the list is derived locally from a
    /// full submissions fetch instead; only a failure of that fallback fetch
    /// is an error.
    pub async fn fetch_sports(&self) -> Result<Vec<String>, ClientError> {
        let mut request = self
            .http
            .get(format!("{}/submissions/sports", self.base_url));
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        match request.send().await.and_then(|r| r.error_for_status()) {
            Ok(response) => Ok(response.json::<SportsListResponse>().await?.sports),
            Err(e) => {
                log::warn!("sports endpoint unavailable, deriving locally: {}", e);
                let records = self
                    .fetch_all_submissions(&ExportFilter::default())
                    .await?;
                Ok(Self::distinct_sports(&records))
            }
        }
    }

    async fn fetch_page(
        &self,
        page: usize,
        filter: &ExportFilter,
    ) -> Result<SubmissionListResponse, ClientError> {
        let mut request = self
            .http
            .get(format!("{}/submissions", self.base_url))
            .query(&[("page", page.to_string()), ("per_page", PER_PAGE.to_string())]);

        if let Some(status) = filter.status {
            request = request.query(&[("status", status.as_str())]);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        Ok(response.json::<SubmissionListResponse>().await?)
    }

    /// Distinct sport names seen in a record set, sorted for display. The
    /// local fallback behind [`fetch_sports`](Self::fetch_sports).
    pub fn distinct_sports(records: &[StudentRecord]) -> Vec<String> {
        let mut sports: Vec<String> = records
            .iter()
            .map(|r| r.game_sport_competition.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        sports.sort();
        sports.dedup();
        sports
    }
}

/// Keep only records whose sport matches exactly (case-sensitive); sport
/// names are canonical strings from the same backend, not free text.
fn retain_sport(records: &mut Vec<StudentRecord>, sport: &str) {
    records.retain(|r| r.game_sport_competition == sport);
}
