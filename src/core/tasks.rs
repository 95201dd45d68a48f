use crate::core::{merge_into, CountryResult, DirectorySource, TaskKind};
use crate::utils::error::Result;

/// 依序查詢每個國家並合併；重複的國家以最後一次查詢為準
pub async fn fetch_many(source: &dyn DirectorySource, countries: &[String]) -> Result<CountryResult> {
    let mut data = CountryResult::new();

    for (index, country) in countries.iter().enumerate() {
        tracing::debug!("Fetching country {}/{}: {}", index + 1, countries.len(), country);
        let partial = source.fetch(country).await?;
        merge_into(&mut data, partial);
    }

    Ok(data)
}

/// 單一國家查詢，平行展開時的工作單位
pub async fn fetch_one(source: &dyn DirectorySource, country: &str) -> Result<CountryResult> {
    source.fetch(country).await
}

impl TaskKind {
    pub async fn execute(&self, source: &dyn DirectorySource) -> Result<CountryResult> {
        match self {
            TaskKind::FetchMany { countries } => fetch_many(source, countries).await,
            TaskKind::FetchOne { country } => fetch_one(source, country).await,
        }
    }
}
