use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::i18n::Language;

/// Pipeline stages an application moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationStatus {
    New,
    Wishlist,
    Applied,
    Interviewing,
    OfferReceived,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::New,
        ApplicationStatus::Wishlist,
        ApplicationStatus::Applied,
        ApplicationStatus::Interviewing,
        ApplicationStatus::OfferReceived,
        ApplicationStatus::Rejected,
    ];

    /// Wire representation. The server stores these strings verbatim.
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::New => "new",
            ApplicationStatus::Wishlist => "Wishlist",
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Interviewing => "Interviewing",
            ApplicationStatus::OfferReceived => "Offer Received",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    /// Accepts wire strings plus the short forms used on the command line.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_'], " ").as_str() {
            "new" => Some(ApplicationStatus::New),
            "wishlist" => Some(ApplicationStatus::Wishlist),
            "applied" => Some(ApplicationStatus::Applied),
            "interviewing" | "interview" => Some(ApplicationStatus::Interviewing),
            "offer received" | "offer" => Some(ApplicationStatus::OfferReceived),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Timestamp handling ---

/// Parses a server timestamp. The backend emits naive ISO strings without a
/// zone marker; those are treated as UTC (matching what the server actually
/// writes). Strings that already carry an offset are honored as-is.
pub fn parse_server_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Formats a server timestamp for display in local time, `dd/mm/yyyy HH:MM`.
/// Falls back to the raw string when it cannot be parsed.
pub fn format_local_timestamp(raw: &str) -> String {
    match parse_server_timestamp(raw) {
        Some(utc) => utc.with_timezone(&Local).format("%d/%m/%Y %H:%M").to_string(),
        None => raw.to_string(),
    }
}

// --- Wire records ---

/// Record ids arrive as JSON numbers from the server but as strings from some
/// proxies; both normalize to `String`.
fn id_to_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Num(i64),
        Str(String),
    }
    Ok(match Id::deserialize(deserializer)? {
        Id::Num(n) => n.to_string(),
        Id::Str(s) => s,
    })
}

/// Wire shape of a `/api/jds` record. Field names are snake_case with
/// camelCase aliases tolerated at the decode boundary only.
#[derive(Debug, Deserialize)]
pub struct JdRecord {
    #[serde(deserialize_with = "id_to_string")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updatedAt")]
    pub updated_at: Option<String>,
}

/// Canonical client-side JD shape.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDescription {
    pub id: String,
    pub title: String,
    pub company: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<JdRecord> for JobDescription {
    fn from(record: JdRecord) -> Self {
        let format = |raw: Option<String>| {
            raw.as_deref()
                .map(format_local_timestamp)
                .unwrap_or_else(|| "-".to_string())
        };
        JobDescription {
            id: record.id,
            title: record.title.unwrap_or_else(|| "Untitled".to_string()),
            company: record.company.unwrap_or_default(),
            content: record.content.unwrap_or_default(),
            created_at: format(record.created_at),
            updated_at: format(record.updated_at),
        }
    }
}

/// Wire shape of a `/api/applications` record.
#[derive(Debug, Deserialize)]
pub struct ApplicationRecord {
    #[serde(deserialize_with = "id_to_string")]
    pub id: String,
    #[serde(default, alias = "companyName")]
    pub company_name: Option<String>,
    #[serde(default, alias = "jobTitle")]
    pub job_title: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "matchScore")]
    pub match_score: Option<i64>,
    #[serde(default, alias = "analysisResult")]
    pub analysis_result: Option<serde_json::Value>,
    #[serde(default, alias = "jdContent")]
    pub jd_content: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
}

/// Canonical client-side application shape.
#[derive(Debug, Clone)]
pub struct Application {
    pub id: String,
    pub company_name: String,
    pub job_title: String,
    pub status: ApplicationStatus,
    pub match_score: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub date_display: String,
    pub analysis: Option<AnalysisReport>,
    pub jd_content: String,
}

impl From<ApplicationRecord> for Application {
    fn from(record: ApplicationRecord) -> Self {
        let status = match record.status.as_deref() {
            None | Some("") => ApplicationStatus::New,
            Some(raw) => ApplicationStatus::parse(raw).unwrap_or_else(|| {
                tracing::warn!(
                    status = raw,
                    id = %record.id,
                    "unknown application status, defaulting to new"
                );
                ApplicationStatus::New
            }),
        };
        let created_at = record.created_at.as_deref().and_then(parse_server_timestamp);
        let date_display = record
            .created_at
            .as_deref()
            .map(format_local_timestamp)
            .unwrap_or_else(|| "N/A".to_string());
        Application {
            id: record.id,
            company_name: record.company_name.unwrap_or_default(),
            job_title: record.job_title.unwrap_or_default(),
            status,
            match_score: record.match_score.unwrap_or(0),
            created_at,
            date_display,
            analysis: record.analysis_result.and_then(decode_analysis_value),
            jd_content: record.jd_content.unwrap_or_default(),
        }
    }
}

/// The server persists the report stringified; older records carry it as a
/// plain object. Both decode to the same type.
pub fn decode_analysis_value(value: serde_json::Value) -> Option<AnalysisReport> {
    let parsed = match value {
        serde_json::Value::Null => return None,
        serde_json::Value::String(s) if s.trim().is_empty() => return None,
        serde_json::Value::String(s) => serde_json::from_str(&s),
        other => serde_json::from_value(other),
    };
    match parsed {
        Ok(report) => Some(report),
        Err(err) => {
            tracing::warn!(%err, "discarding malformed embedded analysis result");
            None
        }
    }
}

// --- Analysis report (opaque value from the remote analysis service) ---

/// The five radar axes, in display order.
pub const RADAR_AXES: [&str; 5] = [
    "Hard Skills",
    "Soft Skills",
    "Experience",
    "Education",
    "Domain Knowledge",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub matching_score: MatchingScore,
    #[serde(default)]
    pub requirements_breakdown: RequirementsBreakdown,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
    #[serde(default)]
    pub radar_chart: HashMap<String, u8>,
    #[serde(default)]
    pub radar_reasoning: HashMap<String, Bilingual>,
    #[serde(default)]
    pub bilingual_content: BilingualContent,
}

impl AnalysisReport {
    pub fn candidate_name(&self) -> &str {
        if self.personal_info.name.is_empty() {
            "Unknown"
        } else {
            &self.personal_info.name
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub experience: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchingScore {
    #[serde(default)]
    pub percentage: i64,
    #[serde(default)]
    pub explanation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequirementsBreakdown {
    #[serde(default)]
    pub must_have_ratio: String,
    #[serde(default)]
    pub nice_to_have_ratio: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bilingual {
    #[serde(default)]
    pub en: String,
    #[serde(default)]
    pub vi: String,
}

impl Bilingual {
    pub fn get(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.en,
            Language::Vi => &self.vi,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BilingualList {
    #[serde(default)]
    pub en: Vec<String>,
    #[serde(default)]
    pub vi: Vec<String>,
}

impl BilingualList {
    pub fn get(&self, lang: Language) -> &[String] {
        match lang {
            Language::En => &self.en,
            Language::Vi => &self.vi,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    #[serde(default)]
    pub jd_requirement: String,
    #[serde(default)]
    pub cv_evidence: String,
    #[serde(default)]
    pub status: String,
}

impl ComparisonRow {
    pub fn is_matched(&self) -> bool {
        self.status.eq_ignore_ascii_case("matched")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BilingualContent {
    #[serde(default)]
    pub general_assessment: Bilingual,
    #[serde(default)]
    pub comparison_table: Vec<ComparisonRow>,
    #[serde(default)]
    pub strengths: BilingualList,
    #[serde(default)]
    pub weaknesses_missing_skills: BilingualList,
    #[serde(default)]
    pub interview_questions: BilingualList,
}

// --- Request payloads ---

#[derive(Debug, Serialize)]
pub struct NewJd {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub content: String,
}

#[derive(Debug, Default, Serialize)]
pub struct JdUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewApplication {
    pub company_name: String,
    pub job_title: String,
    pub status: String,
    pub match_score: i64,
    pub analysis_result: Option<serde_json::Value>,
    pub jd_content: String,
}

#[derive(Debug, Default, Serialize)]
pub struct ApplicationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

impl ApplicationUpdate {
    pub fn status(status: ApplicationStatus) -> Self {
        ApplicationUpdate {
            status: Some(status.as_str().to_string()),
            ..Default::default()
        }
    }
}
