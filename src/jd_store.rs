use crate::api::{ApiClient, ApiError};
use crate::models::{JdRecord, JdUpdate, JobDescription, NewJd};

/// Client-side store for the saved JD library.
///
/// The in-memory list is a read-through cache of the remote collection and is
/// never mutated before the server confirms a write. `refresh` is the only
/// bulk resync path; when it fails the previous snapshot stays visible.
pub struct JdStore {
    api: ApiClient,
    jds: Vec<JobDescription>,
}

impl JdStore {
    pub fn new(api: ApiClient) -> Self {
        Self { api, jds: Vec::new() }
    }

    pub fn jds(&self) -> &[JobDescription] {
        &self.jds
    }

    pub fn get(&self, id: &str) -> Option<&JobDescription> {
        self.jds.iter().find(|jd| jd.id == id)
    }

    /// Fetches the full list. Failures are logged and swallowed, leaving the
    /// cached list unchanged (availability over freshness).
    pub async fn refresh(&mut self) {
        match self.api.get_json::<Vec<JdRecord>>("/api/jds").await {
            Ok(records) => {
                self.jds = records.into_iter().map(JobDescription::from).collect();
            }
            Err(err) => {
                tracing::error!(%err, "failed to refresh JD list, keeping cached snapshot");
            }
        }
    }

    /// Creates a JD and prepends the server-confirmed record to the list.
    pub async fn create(
        &mut self,
        title: &str,
        company: Option<&str>,
        content: &str,
    ) -> Result<&JobDescription, ApiError> {
        let payload = NewJd {
            title: title.to_string(),
            company: company.map(str::to_string),
            content: content.to_string(),
        };
        let record: JdRecord = self.api.post_json("/api/jds", &payload).await?;
        self.jds.insert(0, record.into());
        Ok(&self.jds[0])
    }

    /// Patches a subset of fields and replaces the matching entry in place,
    /// preserving list order.
    pub async fn update(&mut self, id: &str, updates: &JdUpdate) -> Result<(), ApiError> {
        let record: JdRecord = self
            .api
            .patch_json(&format!("/api/jds/{id}"), updates)
            .await?;
        let updated = JobDescription::from(record);
        if let Some(slot) = self.jds.iter_mut().find(|jd| jd.id == updated.id) {
            *slot = updated;
        }
        Ok(())
    }

    /// Deletes remotely first; the local entry is removed only after the
    /// server confirms, so a failed delete cannot ghost-remove a record.
    pub async fn delete(&mut self, id: &str) -> Result<(), ApiError> {
        self.api.delete(&format!("/api/jds/{id}")).await?;
        self.jds.retain(|jd| jd.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn store_with(server: &MockServer) -> JdStore {
        let api = ApiClient::new(&server.uri(), "test-session").unwrap();
        JdStore::new(api)
    }

    fn jd_body(id: i64, title: &str) -> serde_json::Value {
        json!({
            "id": id,
            "title": title,
            "company": "Acme",
            "content": "Rust, PostgreSQL",
            "created_at": "2025-03-01T10:30:00",
            "updated_at": "2025-03-01T10:30:00"
        })
    }

    #[tokio::test]
    async fn test_create_prepends_confirmed_record_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([jd_body(1, "Old")])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/jds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(jd_body(2, "Backend Engineer")))
            .mount(&server)
            .await;

        let mut store = store_with(&server).await;
        store.refresh().await;

        let created = store
            .create("Backend Engineer", Some("Acme"), "Rust, PostgreSQL")
            .await
            .unwrap();
        assert_eq!(created.id, "2");

        assert_eq!(store.jds().len(), 2);
        assert_eq!(store.jds()[0].id, "2");
        assert_eq!(store.jds()[0].created_at, crate::models::format_local_timestamp("2025-03-01T10:30:00"));
        assert_eq!(store.jds().iter().filter(|jd| jd.id == "2").count(), 1);
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jds"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([jd_body(1, "One"), jd_body(2, "Two")])),
            )
            .mount(&server)
            .await;

        let mut store = store_with(&server).await;
        store.refresh().await;
        let first = store.jds().to_vec();
        store.refresh().await;
        assert_eq!(store.jds(), first.as_slice());
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_cached_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([jd_body(1, "One")])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/jds"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut store = store_with(&server).await;
        store.refresh().await;
        assert_eq!(store.jds().len(), 1);

        store.refresh().await;
        assert_eq!(store.jds().len(), 1);
        assert_eq!(store.jds()[0].title, "One");
    }

    #[tokio::test]
    async fn test_update_replaces_entry_in_place() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jds"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([jd_body(1, "Backend Engineer"), jd_body(2, "Other")])),
            )
            .mount(&server)
            .await;
        // Stub server echoes the patch applied to the record.
        Mock::given(method("PATCH"))
            .and(path("/api/jds/1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(jd_body(1, "Senior Backend Engineer")),
            )
            .mount(&server)
            .await;

        let mut store = store_with(&server).await;
        store.refresh().await;

        let updates = JdUpdate {
            title: Some("Senior Backend Engineer".to_string()),
            ..Default::default()
        };
        store.update("1", &updates).await.unwrap();

        assert_eq!(store.jds().len(), 2);
        assert_eq!(store.jds()[0].id, "1");
        assert_eq!(store.jds()[0].title, "Senior Backend Engineer");
        assert_eq!(store.jds()[0].company, "Acme");
        assert_eq!(store.jds()[1].title, "Other");
    }

    #[tokio::test]
    async fn test_update_failure_is_surfaced_and_list_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jds"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([jd_body(1, "One")])))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/api/jds/1"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"detail": "JD not found or access denied"})),
            )
            .mount(&server)
            .await;

        let mut store = store_with(&server).await;
        store.refresh().await;

        let err = store
            .update("1", &JdUpdate { title: Some("X".into()), ..Default::default() })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "JD not found or access denied");
        assert_eq!(store.jds()[0].title, "One");
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_list_unchanged() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jds"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([jd_body(1, "One"), jd_body(2, "Two")])),
            )
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/jds/1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut store = store_with(&server).await;
        store.refresh().await;

        assert!(store.delete("1").await.is_err());
        assert_eq!(store.jds().len(), 2);
    }

    #[tokio::test]
    async fn test_successful_delete_removes_exactly_one() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/jds"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([jd_body(1, "One"), jd_body(2, "Two")])),
            )
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/jds/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let mut store = store_with(&server).await;
        store.refresh().await;

        store.delete("1").await.unwrap();
        assert_eq!(store.jds().len(), 1);
        assert_eq!(store.jds()[0].id, "2");
    }
}
