use crate::error::Result;
use crate::models::{DailyRecord, StationMetadata, StationQuery, YearMonth};
use crate::readers::PageFetcher;
use crate::utils::progress::ProgressReporter;
use futures::stream::{self, StreamExt};
use rayon::prelude::*;
use tracing::{info, warn};

/// What happened to one month of a range run
#[derive(Debug, Clone)]
pub struct MonthOutcome {
    pub month: YearMonth,
    pub records: usize,
    pub error: Option<String>,
}

impl MonthOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RangeReport {
    pub records: Vec<DailyRecord>,
    pub outcomes: Vec<MonthOutcome>,
}

impl RangeReport {
    pub fn failed_months(&self) -> impl Iterator<Item = &MonthOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn summary(&self) -> String {
        let failed = self.failed_months().count();
        let mut summary = format!(
            "Months requested: {}, succeeded: {}, failed: {}, records: {}",
            self.outcomes.len(),
            self.outcomes.len() - failed,
            failed,
            self.records.len()
        );
        for outcome in self.failed_months() {
            summary.push_str(&format!(
                "\n  {}: {}",
                outcome.month,
                outcome.error.as_deref().unwrap_or_default()
            ));
        }
        summary
    }
}

/// Collects several months of one station
pub struct MonthlyProcessor {
    fetcher: PageFetcher,
    max_concurrent: usize,
    precipitation: bool,
}

impl MonthlyProcessor {
    pub fn new(fetcher: PageFetcher) -> Self {
        Self {
            fetcher,
            max_concurrent: 1,
            precipitation: true,
        }
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn with_precipitation(mut self, precipitation: bool) -> Self {
        self.precipitation = precipitation;
        self
    }

    /// Fetch and extract every month from `start` to `end`.
    ///
    /// A month that cannot be fetched or holds no data is reported in the
    /// outcomes and skipped; other errors abort the run.
    pub async fn process_range(
        &self,
        station: &StationMetadata,
        start: YearMonth,
        end: YearMonth,
        progress: Option<&ProgressReporter>,
    ) -> Result<RangeReport> {
        let queries: Vec<StationQuery> = start
            .through(end)
            .into_iter()
            .map(|m| station.query(m.year, m.month))
            .collect::<Result<_>>()?;

        info!(
            station = %station.name,
            months = queries.len(),
            max_concurrent = self.max_concurrent,
            "fetching month range"
        );

        if let Some(p) = progress {
            p.set_message("Fetching daily tables...");
        }

        let fetcher = &self.fetcher;
        let pages: Vec<(StationQuery, Result<String>)> = stream::iter(queries)
            .map(|query| async move {
                let page = fetcher.fetch_page(&query).await;
                (query, page)
            })
            .buffered(self.max_concurrent)
            .inspect(|_| {
                if let Some(p) = progress {
                    p.increment(1);
                }
            })
            .collect()
            .await;

        if let Some(p) = progress {
            p.set_message("Extracting daily records...");
        }

        let reader = self.fetcher.reader();
        let precipitation = self.precipitation;
        let extracted: Vec<(StationQuery, Result<Vec<DailyRecord>>)> = pages
            .into_par_iter()
            .map(|(query, page)| {
                let records = page.and_then(|html| reader.extract(&html, &query, precipitation));
                (query, records)
            })
            .collect();

        let mut report = RangeReport::default();
        for (query, result) in extracted {
            let month = YearMonth {
                year: query.year,
                month: query.month,
            };
            match result {
                Ok(records) => {
                    report.outcomes.push(MonthOutcome {
                        month,
                        records: records.len(),
                        error: None,
                    });
                    report.records.extend(records);
                }
                Err(e) if e.is_month_scoped() => {
                    warn!(%month, error = %e, "skipping month");
                    report.outcomes.push(MonthOutcome {
                        month,
                        records: 0,
                        error: Some(e.to_string()),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        report.records.sort_by_key(|r| r.date);

        if let Some(p) = progress {
            p.finish_with_message(&format!("Collected {} records", report.records.len()));
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_summary_lists_failures() {
        let ok = YearMonth::new(2024, 1).unwrap();
        let bad = YearMonth::new(2024, 2).unwrap();
        let report = RangeReport {
            records: Vec::new(),
            outcomes: vec![
                MonthOutcome {
                    month: ok,
                    records: 31,
                    error: None,
                },
                MonthOutcome {
                    month: bad,
                    records: 0,
                    error: Some("Daily data table not found in document".to_string()),
                },
            ],
        };

        assert_eq!(report.failed_months().count(), 1);
        let summary = report.summary();
        assert!(summary.contains("succeeded: 1, failed: 1"));
        assert!(summary.contains("2024-02: Daily data table not found"));
    }
}
