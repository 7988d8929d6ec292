use crate::error::{ProcessingError, Result};
use crate::models::{DailyRecord, Precipitation, YearMonth};
use chrono::NaiveDate;
use std::collections::BTreeSet;

#[derive(Debug)]
pub struct WeatherStatistics {
    pub total_records: usize,
    pub date_range: (NaiveDate, NaiveDate),
    pub expected_days: usize,
    pub max_temp_stats: Option<TemperatureStats>,
    pub min_temp_stats: Option<TemperatureStats>,
    pub precipitation: Option<PrecipitationStats>,
}

impl WeatherStatistics {
    pub fn coverage_percentage(&self) -> f64 {
        if self.expected_days == 0 {
            return 0.0;
        }
        (self.total_records as f64 / self.expected_days as f64) * 100.0
    }

    pub fn detailed_summary(&self) -> String {
        let mut summary = String::new();

        summary.push_str("=== Daily Weather Summary ===\n");
        summary.push_str(&format!(
            "Period: {} to {}\n",
            self.date_range.0, self.date_range.1
        ));
        summary.push_str(&format!(
            "Records: {} of {} days ({:.1}% coverage)\n",
            self.total_records,
            self.expected_days,
            self.coverage_percentage()
        ));

        if let Some(stats) = &self.max_temp_stats {
            summary.push_str(&format!("\nDaily Max Temperature:\n{}", stats.summary()));
        }
        if let Some(stats) = &self.min_temp_stats {
            summary.push_str(&format!("\nDaily Min Temperature:\n{}", stats.summary()));
        }

        if let Some(precip) = &self.precipitation {
            summary.push_str(&format!(
                "\nPrecipitation Days: rain {}, snow {}, dry {}\n",
                precip.rain_days, precip.snow_days, precip.dry_days
            ));
        }

        summary
    }
}

#[derive(Debug)]
pub struct TemperatureStats {
    pub count: usize,
    pub mean: f64,
    pub highest: f64,
    pub highest_date: NaiveDate,
    pub lowest: f64,
    pub lowest_date: NaiveDate,
}

impl TemperatureStats {
    fn from_values(values: &[(NaiveDate, f64)]) -> Option<Self> {
        let (first_date, first) = *values.first()?;
        let mut stats = Self {
            count: values.len(),
            mean: 0.0,
            highest: first,
            highest_date: first_date,
            lowest: first,
            lowest_date: first_date,
        };

        let mut sum = 0.0;
        for &(date, value) in values {
            sum += value;
            if value > stats.highest {
                stats.highest = value;
                stats.highest_date = date;
            }
            if value < stats.lowest {
                stats.lowest = value;
                stats.lowest_date = date;
            }
        }
        stats.mean = sum / values.len() as f64;

        Some(stats)
    }

    fn summary(&self) -> String {
        format!(
            "  Mean: {:.1}°C over {} days\n  Highest: {:.1}°C on {}\n  Lowest: {:.1}°C on {}\n",
            self.mean, self.count, self.highest, self.highest_date, self.lowest, self.lowest_date
        )
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct PrecipitationStats {
    pub rain_days: usize,
    pub snow_days: usize,
    pub dry_days: usize,
}

pub struct WeatherAnalyzer;

impl WeatherAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Summarise any slice of daily records (one month or several)
    pub fn analyze(&self, records: &[DailyRecord]) -> Result<WeatherStatistics> {
        let first = records
            .iter()
            .map(|r| r.date)
            .min()
            .ok_or_else(|| ProcessingError::MissingData("No records to analyze".to_string()))?;
        let last = records.iter().map(|r| r.date).max().unwrap_or(first);

        let months: BTreeSet<YearMonth> = records.iter().map(|r| YearMonth::of(r.date)).collect();
        let expected_days = months.iter().map(|m| m.days_in_month() as usize).sum();

        let max_values: Vec<(NaiveDate, f64)> = records
            .iter()
            .filter_map(|r| r.max_temp.map(|t| (r.date, t)))
            .collect();
        let min_values: Vec<(NaiveDate, f64)> = records
            .iter()
            .filter_map(|r| r.min_temp.map(|t| (r.date, t)))
            .collect();

        let classified: Vec<Precipitation> =
            records.iter().filter_map(|r| r.precipitation).collect();
        let precipitation = (!classified.is_empty()).then(|| {
            let mut stats = PrecipitationStats::default();
            for p in classified {
                match p {
                    Precipitation::Rain => stats.rain_days += 1,
                    Precipitation::Snow => stats.snow_days += 1,
                    Precipitation::None => stats.dry_days += 1,
                }
            }
            stats
        });

        Ok(WeatherStatistics {
            total_records: records.len(),
            date_range: (first, last),
            expected_days,
            max_temp_stats: TemperatureStats::from_values(&max_values),
            min_temp_stats: TemperatureStats::from_values(&min_values),
            precipitation,
        })
    }
}

impl Default for WeatherAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
