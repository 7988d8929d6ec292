use crate::config::FetchConfig;
use crate::error::{ProcessingError, Result};
use crate::models::{DailyRecord, StationQuery};
use crate::readers::daily_table_reader::{decode_utf8, DailyTableReader};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

/// HTTP side of the extractor: one request per station/month, no retry
pub struct PageFetcher {
    client: Client,
    base_url: String,
    reader: DailyTableReader,
}

impl PageFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ProcessingError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            reader: DailyTableReader::new(),
        })
    }

    pub fn with_reader(mut self, reader: DailyTableReader) -> Self {
        self.reader = reader;
        self
    }

    /// Daily-table URL for one station and month
    pub fn month_url(&self, query: &StationQuery) -> String {
        build_month_url(&self.base_url, query)
    }

    /// Download the page for one station and month
    #[instrument(skip(self, query), fields(station = %query.station_name, year = query.year, month = query.month))]
    pub async fn fetch_page(&self, query: &StationQuery) -> Result<String> {
        let url = self.month_url(query);
        debug!(%url, "requesting daily table");

        let fetch_failed = |reason: String| ProcessingError::FetchFailed {
            url: url.clone(),
            reason,
        };

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| fetch_failed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_failed(format!("HTTP status {}", status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| fetch_failed(e.to_string()))?;

        debug!(bytes = body.len(), "received daily table");
        Ok(decode_utf8(&body))
    }

    /// Download and extract one month
    pub async fn fetch_month(
        &self,
        query: &StationQuery,
        precipitation: bool,
    ) -> Result<Vec<DailyRecord>> {
        let html = self.fetch_page(query).await?;
        self.reader.extract(&html, query, precipitation)
    }

    pub fn reader(&self) -> &DailyTableReader {
        &self.reader
    }
}

pub fn build_month_url(base_url: &str, query: &StationQuery) -> String {
    format!(
        "{}?prec_no={}&block_no={}&year={}&month={:02}&day=1&view=",
        base_url, query.station_precip_id, query.station_block_id, query.year, query.month
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::JMA_DAILY_URL;

    fn tokyo(year: i32, month: u32) -> StationQuery {
        StationQuery {
            year,
            month,
            station_precip_id: 44,
            station_block_id: 47662,
            station_name: "Tokyo".to_string(),
        }
    }

    #[test]
    fn test_month_url() {
        let url = build_month_url(JMA_DAILY_URL, &tokyo(2023, 4));
        assert_eq!(
            url,
            "https://www.data.jma.go.jp/obd/stats/etrn/view/daily_s1.php?prec_no=44&block_no=47662&year=2023&month=04&day=1&view="
        );
    }

    #[test]
    fn test_fetcher_uses_configured_base_url() {
        let config = FetchConfig {
            base_url: "http://localhost:9/daily.php".to_string(),
            ..FetchConfig::default()
        };
        let fetcher = PageFetcher::new(&config).unwrap();
        assert!(fetcher
            .month_url(&tokyo(2020, 12))
            .starts_with("http://localhost:9/daily.php?prec_no=44&block_no=47662&year=2020&month=12"));
    }

    #[tokio::test]
    async fn test_transport_error_is_fetch_failed() {
        // nothing listens on the discard port
        let config = FetchConfig {
            base_url: "http://127.0.0.1:9/daily.php".to_string(),
            timeout_secs: 2,
            ..FetchConfig::default()
        };
        let fetcher = PageFetcher::new(&config).unwrap();

        let err = fetcher.fetch_month(&tokyo(2024, 1), true).await.unwrap_err();
        match err {
            ProcessingError::FetchFailed { url, .. } => assert!(url.contains("month=01")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
