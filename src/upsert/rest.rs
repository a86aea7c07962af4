// PostgREST-style upsert endpoint (`{url}/rest/v1/{table}`)
use crate::model::UpsertError;
use crate::upsert::{ProductRow, Upserter};
use reqwest::Client;
use std::time::Duration;
use tracing::warn;

pub struct RestUpserter {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestUpserter {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, UpsertError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }
}

#[async_trait::async_trait]
impl Upserter for RestUpserter {
    async fn upsert(&self, table: &str, row: &ProductRow) -> Result<(), UpsertError> {
        let response = self
            .client
            .post(self.endpoint(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "resolution=merge-duplicates")
            .json(row)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 200 || status.as_u16() == 201 {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_else(|_| "unknown".into());
        warn!("❌ Insert failed [{}]: {}", status, body);
        Err(UpsertError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_and_table() {
        let upserter = RestUpserter::new("https://db.example.co/", "key").unwrap();
        assert_eq!(upserter.endpoint("products"), "https://db.example.co/rest/v1/products");
    }
}
