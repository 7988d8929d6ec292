use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::{ProcessingError, Result};

/// A JMA observation station as addressed by the daily-table pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StationMetadata {
    #[validate(length(min = 1))]
    pub key: String,

    /// Display label used on the JMA site (e.g. 東京)
    pub label: String,

    #[validate(length(min = 1))]
    pub name: String,

    #[validate(range(min = 1, max = 99))]
    pub prec_no: u32,

    #[validate(range(min = 1))]
    pub block_no: u32,
}

impl StationMetadata {
    pub fn new(key: &str, label: &str, name: &str, prec_no: u32, block_no: u32) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            name: name.to_string(),
            prec_no,
            block_no,
        }
    }

    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.trim();
        self.key.eq_ignore_ascii_case(needle)
            || self.name.eq_ignore_ascii_case(needle)
            || self.label == needle
    }

    /// Build a validated query for one month of this station
    pub fn query(&self, year: i32, month: u32) -> Result<StationQuery> {
        let query = StationQuery {
            year,
            month,
            station_precip_id: self.prec_no,
            station_block_id: self.block_no,
            station_name: self.name.clone(),
        };
        query.validate()?;
        Ok(query)
    }
}

/// One station/year/month request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct StationQuery {
    #[validate(range(min = 1872, max = 9999))]
    pub year: i32,

    #[validate(range(min = 1, max = 12))]
    pub month: u32,

    pub station_precip_id: u32,

    pub station_block_id: u32,

    #[validate(length(min = 1))]
    pub station_name: String,
}

/// Stations offered out of the box; more can be declared in the config file
pub fn builtin_stations() -> Vec<StationMetadata> {
    vec![
        StationMetadata::new("tokyo", "東京", "Tokyo", 44, 47662),
        StationMetadata::new("osaka", "大阪", "Osaka", 62, 47772),
        StationMetadata::new("sapporo", "北海道(札幌)", "Sapporo", 14, 47412),
        StationMetadata::new("fukuoka", "福岡", "Fukuoka", 82, 47807),
    ]
}

#[derive(Debug, Clone)]
pub struct StationCatalog {
    stations: Vec<StationMetadata>,
}

impl StationCatalog {
    pub fn new() -> Self {
        Self {
            stations: builtin_stations(),
        }
    }

    /// Add stations declared in configuration. A station with an existing key replaces it.
    pub fn with_stations(mut self, extra: &[StationMetadata]) -> Result<Self> {
        for station in extra {
            station.validate()?;
            match self.stations.iter_mut().find(|s| s.key == station.key) {
                Some(existing) => *existing = station.clone(),
                None => self.stations.push(station.clone()),
            }
        }
        Ok(self)
    }

    pub fn find(&self, needle: &str) -> Result<&StationMetadata> {
        self.stations
            .iter()
            .find(|s| s.matches(needle))
            .ok_or_else(|| ProcessingError::StationNotFound(needle.to_string()))
    }

    pub fn stations(&self) -> &[StationMetadata] {
        &self.stations
    }
}

impl Default for StationCatalog {
    fn default() -> Self {
        Self::new()
    }
}
