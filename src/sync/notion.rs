//! Notion-backed record store.
//!
//! Each posting becomes one page in a Notion database; existence is checked
//! by querying on the Job Link property.

use reqwest::Client;
use serde_json::{json, Value};

use crate::error::{AppError, Result};
use crate::models::{Posting, SyncConfig};
use crate::utils::date;

use super::RecordStore;

const API_BASE: &str = "https://api.notion.com/v1";
const NOTION_VERSION: &str = "2022-06-28";

/// Notion API client scoped to a single database.
pub struct NotionStore {
    client: Client,
    token: String,
    database_id: String,
}

impl NotionStore {
    pub fn new(token: String, database_id: String) -> Self {
        Self {
            client: Client::new(),
            token,
            database_id,
        }
    }

    /// Build a store from config, falling back to the conventional
    /// environment variables for credentials.
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        let token = config
            .token
            .clone()
            .or_else(|| std::env::var("NOTION_API_TOKEN").ok())
            .ok_or_else(|| {
                AppError::sync("missing Notion API token (sync.token or NOTION_API_TOKEN)")
            })?;
        let database_id = config
            .database_id
            .clone()
            .or_else(|| std::env::var("NOTION_DATABASE_ID").ok())
            .ok_or_else(|| {
                AppError::sync("missing Notion database id (sync.database_id or NOTION_DATABASE_ID)")
            })?;
        Ok(Self::new(token, database_id))
    }

    async fn post(&self, url: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::sync(format!(
                "Notion API returned {status}: {detail}"
            )));
        }
        Ok(response.json().await?)
    }
}

#[async_trait::async_trait]
impl RecordStore for NotionStore {
    async fn exists(&self, job_link: &str) -> Result<bool> {
        let url = format!("{API_BASE}/databases/{}/query", self.database_id);
        let body = json!({
            "filter": {
                "property": "Job Link",
                "url": { "equals": job_link }
            }
        });

        let payload = self.post(&url, &body).await?;
        let results = payload
            .get("results")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0);
        Ok(results > 0)
    }

    async fn create(&self, posting: &Posting) -> Result<()> {
        let url = format!("{API_BASE}/pages");
        let body = json!({
            "parent": { "database_id": self.database_id },
            "properties": page_properties(posting),
        });

        self.post(&url, &body).await?;
        log::debug!(
            "Created record for {} at {}",
            posting.role_name,
            posting.company_name
        );
        Ok(())
    }
}

/// Map a posting onto the database's property schema.
fn page_properties(posting: &Posting) -> Value {
    let mut properties = json!({
        "Role Name": {
            "title": [{ "text": { "content": posting.role_name } }]
        },
        "Company": {
            "select": { "name": posting.company_name }
        },
        "Location": {
            "rich_text": [{ "text": { "content": posting.location } }]
        },
        "Job Link": {
            "url": posting.job_link
        },
        "Employment Type": {
            "select": { "name": posting.employment_type }
        },
        "Team": {
            "rich_text": [{ "text": { "content": posting.team } }]
        },
        "Compensation": {
            "rich_text": [{ "text": { "content": posting.compensation } }]
        },
        "Source": {
            "select": { "name": posting.source.as_str() }
        },
    });

    // Notion rejects malformed dates outright, so only set the property
    // when the posting's date parses.
    if let Some(parsed) = date::parse_published_date(&posting.published_date) {
        properties["Published Date"] = json!({
            "date": { "start": parsed.format("%Y-%m-%d").to_string() }
        });
    }

    properties
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobSource;

    fn sample(published: &str) -> Posting {
        Posting {
            role_name: "Forward Deployed Engineer".to_string(),
            company_name: "Acme".to_string(),
            location: "Remote".to_string(),
            job_link: "https://example.com/job/1".to_string(),
            employment_type: "FullTime".to_string(),
            team: "Engineering".to_string(),
            published_date: published.to_string(),
            compensation: "Not disclosed".to_string(),
            source: JobSource::Ashby,
            job_id: "1".to_string(),
        }
    }

    #[test]
    fn properties_cover_the_schema() {
        let props = page_properties(&sample("2026-07-08"));
        assert_eq!(
            props["Role Name"]["title"][0]["text"]["content"],
            "Forward Deployed Engineer"
        );
        assert_eq!(props["Company"]["select"]["name"], "Acme");
        assert_eq!(props["Job Link"]["url"], "https://example.com/job/1");
        assert_eq!(props["Source"]["select"]["name"], "Ashby");
        assert_eq!(props["Published Date"]["date"]["start"], "2026-07-08");
    }

    #[test]
    fn unparseable_date_is_omitted() {
        let props = page_properties(&sample("sometime soon"));
        assert!(props.get("Published Date").is_none());
    }

    #[test]
    fn missing_credentials_fail_fast() {
        let config = SyncConfig {
            token: None,
            database_id: None,
            ..SyncConfig::default()
        };
        // Only exercises the config path; env fallbacks are unset in tests.
        if std::env::var("NOTION_API_TOKEN").is_err() {
            assert!(NotionStore::from_config(&config).is_err());
        }
    }
}
