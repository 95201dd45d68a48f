use crate::core::{CountryResult, DirectorySource, UniversityRecord};
use crate::utils::error::{Result, ServiceError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// 大學目錄服務的 HTTP 客戶端
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    client: Client,
    base_url: String,
}

impl DirectoryClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 將回應內容解析成大學清單；非物件元素略過
    pub fn parse_records(body: &str) -> Result<Vec<UniversityRecord>> {
        let json_data: serde_json::Value = serde_json::from_str(body)?;

        let items = match json_data {
            serde_json::Value::Array(items) => items,
            other => {
                return Err(ServiceError::UnexpectedPayload {
                    found: json_kind(&other).to_string(),
                })
            }
        };

        let mut records = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            match UniversityRecord::from_json(item) {
                Some(record) => records.push(record),
                None => tracing::warn!(
                    "⚠️ Skipping directory entry #{}: expected an object, got {}",
                    index,
                    json_kind(item)
                ),
            }
        }

        Ok(records)
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[async_trait]
impl DirectorySource for DirectoryClient {
    async fn fetch(&self, country: &str) -> Result<CountryResult> {
        tracing::debug!("Querying directory {} for country '{}'", self.base_url, country);

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("country", country)])
            .send()
            .await?;

        tracing::debug!("Directory response status: {}", response.status());

        // 非 2xx 視為傳輸錯誤，交給任務層重試
        let response = response.error_for_status()?;
        let body = response.text().await?;
        let records = Self::parse_records(&body)?;

        tracing::info!("🎓 {} universities found for '{}'", records.len(), country);

        let mut result = CountryResult::new();
        result.insert(country.to_string(), records);
        Ok(result)
    }
}
