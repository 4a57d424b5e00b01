use std::path::Path;

use anyhow::{Context, Result, bail};
use reqwest::multipart::{Form, Part};

use crate::api::{ApiClient, ApiError};
use crate::i18n::{Language, tr};
use crate::models::{
    AnalysisReport, Application, ApplicationRecord, ApplicationStatus, ApplicationUpdate,
    NewApplication,
};
use crate::notify::NotificationFeed;

/// Where the JD for an analysis came from: a saved library record or text
/// pasted ad hoc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JdSource {
    Library { id: String },
    Manual { content: String },
}

/// The most recent analysis, held outside the application list until the user
/// commits it to the pipeline or discards it.
#[derive(Debug, Clone)]
pub struct LastAnalysis {
    pub report: AnalysisReport,
    pub source: JdSource,
}

/// Client-side store for tracked applications, the analysis workflow, and the
/// notification feed.
///
/// Same consistency rules as the JD store: the list is a read-through cache,
/// writes are pessimistic, and a failed read leaves the old snapshot visible.
pub struct AppStore {
    api: ApiClient,
    lang: Language,
    applications: Vec<Application>,
    total_analyses: usize,
    analyzing: bool,
    analysis_success: bool,
    last_analysis: Option<LastAnalysis>,
    notifications: NotificationFeed,
}

impl AppStore {
    pub fn new(api: ApiClient, lang: Language, notification_capacity: usize) -> Self {
        Self {
            api,
            lang,
            applications: Vec::new(),
            total_analyses: 0,
            analyzing: false,
            analysis_success: false,
            last_analysis: None,
            notifications: NotificationFeed::new(notification_capacity),
        }
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub fn get(&self, id: &str) -> Option<&Application> {
        self.applications.iter().find(|app| app.id == id)
    }

    pub fn language(&self) -> Language {
        self.lang
    }

    pub fn total_analyses(&self) -> usize {
        self.total_analyses
    }

    pub fn is_analyzing(&self) -> bool {
        self.analyzing
    }

    pub fn analysis_success(&self) -> bool {
        self.analysis_success
    }

    /// The success flag is a transient UI pulse; the view clears it after its
    /// display window.
    pub fn clear_analysis_success(&mut self) {
        self.analysis_success = false;
    }

    pub fn last_analysis(&self) -> Option<&LastAnalysis> {
        self.last_analysis.as_ref()
    }

    pub fn notifications(&self) -> &NotificationFeed {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationFeed {
        &mut self.notifications
    }

    /// Fetches the full application list; the analysis counter is seeded from
    /// the live count. Failures are logged and swallowed.
    pub async fn refresh(&mut self) {
        match self.api.get_json::<Vec<ApplicationRecord>>("/api/applications").await {
            Ok(records) => {
                self.applications = records.into_iter().map(Application::from).collect();
                self.total_analyses = self.applications.len();
            }
            Err(err) => {
                tracing::error!(%err, "failed to refresh application list, keeping cached snapshot");
            }
        }
    }

    /// Submits a resume and one JD source for analysis.
    ///
    /// Exactly one of `jd_library_id` / `jd_text` goes on the wire; a library
    /// reference wins when both are supplied. Only one analysis may be in
    /// flight at a time; a second call is rejected without touching any state.
    pub async fn run_analysis(
        &mut self,
        resume: &Path,
        jd_text: Option<&str>,
        jd_library_id: Option<&str>,
    ) -> Result<AnalysisReport> {
        if self.analyzing {
            bail!("an analysis is already in flight");
        }
        self.analyzing = true;
        self.analysis_success = false;

        let result = self.submit_analysis(resume, jd_text, jd_library_id).await;
        self.analyzing = false;

        match result {
            Ok(report) => {
                let source = match jd_library_id {
                    Some(id) => JdSource::Library { id: id.to_string() },
                    None => JdSource::Manual {
                        content: jd_text.unwrap_or_default().to_string(),
                    },
                };
                self.last_analysis = Some(LastAnalysis {
                    report: report.clone(),
                    source,
                });
                self.total_analyses += 1;
                self.analysis_success = true;

                let name = report.candidate_name().to_string();
                let score = report.matching_score.percentage;
                tracing::debug!(candidate = %name, score, "analysis complete");
                self.notifications.push(
                    tr(self.lang, "notif.analysis_success_title"),
                    format!("{name} • {score}% Match"),
                );
                Ok(report)
            }
            Err(err) => {
                let message = err.to_string();
                let message = if message.is_empty() {
                    tr(self.lang, "notif.generic_error").to_string()
                } else {
                    message
                };
                self.notifications
                    .push(tr(self.lang, "notif.analysis_failed_title"), message);
                Err(err)
            }
        }
    }

    async fn submit_analysis(
        &self,
        resume: &Path,
        jd_text: Option<&str>,
        jd_library_id: Option<&str>,
    ) -> Result<AnalysisReport> {
        let bytes = tokio::fs::read(resume)
            .await
            .with_context(|| format!("failed to read resume file {}", resume.display()))?;
        let file_name = resume
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume.pdf".to_string());

        let mut form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        if let Some(id) = jd_library_id {
            form = form.text("jd_id", id.to_string());
        } else if let Some(text) = jd_text {
            form = form.text("jd_text", text.to_string());
        } else {
            bail!("must provide a JD id or JD text");
        }

        let report: AnalysisReport = self.api.post_multipart("/api/analyze", form).await?;
        Ok(report)
    }

    /// Builds a pipeline draft from the last analysis, embedding the report
    /// and the original JD text verbatim. For a library source the caller
    /// resolves the JD content from its store and fills it in afterwards.
    pub fn draft_from_last_analysis(
        &self,
        job_title: &str,
        company_name: &str,
        status: ApplicationStatus,
    ) -> Option<NewApplication> {
        let last = self.last_analysis.as_ref()?;
        let jd_content = match &last.source {
            JdSource::Manual { content } => content.clone(),
            JdSource::Library { .. } => String::new(),
        };
        Some(NewApplication {
            company_name: company_name.to_string(),
            job_title: job_title.to_string(),
            status: status.as_str().to_string(),
            match_score: last.report.matching_score.percentage,
            analysis_result: serde_json::to_value(&last.report).ok(),
            jd_content,
        })
    }

    /// Commits a draft to the pipeline. The confirmed record is prepended,
    /// the analysis counter bumped, and a saved notification emitted.
    pub async fn add_application(&mut self, draft: &NewApplication) -> Result<Application, ApiError> {
        match self
            .api
            .post_json::<ApplicationRecord, _>("/api/applications", draft)
            .await
        {
            Ok(record) => {
                let app = Application::from(record);
                self.applications.insert(0, app.clone());
                self.total_analyses += 1;
                self.notifications.push(
                    tr(self.lang, "notif.app_saved_title"),
                    tr(self.lang, "notif.app_saved_msg"),
                );
                Ok(app)
            }
            Err(err) => {
                tracing::error!(%err, "failed to save application");
                Err(err)
            }
        }
    }

    /// Patches only the fields present and replaces the matching entry in
    /// place, preserving list order.
    pub async fn update_application(
        &mut self,
        id: &str,
        updates: &ApplicationUpdate,
    ) -> Result<(), ApiError> {
        let record: ApplicationRecord = self
            .api
            .patch_json(&format!("/api/applications/{id}"), updates)
            .await?;
        let updated = Application::from(record);
        if let Some(slot) = self.applications.iter_mut().find(|app| app.id == updated.id) {
            *slot = updated;
        }
        Ok(())
    }

    /// Deletes remotely first; local removal happens only on confirmation.
    pub async fn delete_application(&mut self, id: &str) -> Result<(), ApiError> {
        self.api.delete(&format!("/api/applications/{id}")).await?;
        self.applications.retain(|app| app.id != id);
        Ok(())
    }

    /// Moves an application to another pipeline stage.
    pub async fn move_application(
        &mut self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<(), ApiError> {
        self.update_application(id, &ApplicationUpdate::status(status))
            .await
    }
}
