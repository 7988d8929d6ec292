use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::constants::{MAX_VALID_TEMP, MIN_VALID_TEMP};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precipitation {
    Rain,
    Snow,
    None,
}

impl Precipitation {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "rain" => Some(Precipitation::Rain),
            "snow" => Some(Precipitation::Snow),
            "none" => Some(Precipitation::None),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Precipitation::Rain => "rain",
            Precipitation::Snow => "snow",
            Precipitation::None => "none",
        }
    }

    pub fn is_wet(&self) -> bool {
        !matches!(self, Precipitation::None)
    }
}

/// One day of a station's daily table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub max_temp: Option<f64>,
    pub min_temp: Option<f64>,

    /// `None` when classification was not requested
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub precipitation: Option<Precipitation>,
}

impl DailyRecord {
    /// Returns `None` when neither temperature is present.
    pub fn new(
        date: NaiveDate,
        max_temp: Option<f64>,
        min_temp: Option<f64>,
        precipitation: Option<Precipitation>,
    ) -> Option<Self> {
        if max_temp.is_none() && min_temp.is_none() {
            return None;
        }

        Some(Self {
            date,
            max_temp,
            min_temp,
            precipitation,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.max_temp.is_some() && self.min_temp.is_some()
    }

    /// Mean of max and min when both are known
    pub fn mean_temp(&self) -> Option<f64> {
        match (self.max_temp, self.min_temp) {
            (Some(max), Some(min)) => Some((max + min) / 2.0),
            _ => None,
        }
    }

    pub fn temperatures_in_range(&self) -> bool {
        [self.max_temp, self.min_temp]
            .iter()
            .flatten()
            .all(|t| (MIN_VALID_TEMP..=MAX_VALID_TEMP).contains(t))
    }
}
