use crate::utils::constants::{
    DEFAULT_DAY_WEATHER_INDEX, DEFAULT_MAX_TEMP_INDEX, DEFAULT_MIN_TEMP_INDEX,
    DEFAULT_NIGHT_WEATHER_INDEX,
};

/// Cell positions of the fields of interest within a data row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    pub max_temp_index: usize,
    pub min_temp_index: usize,
    pub day_weather_index: usize,
    pub night_weather_index: usize,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            max_temp_index: DEFAULT_MAX_TEMP_INDEX,
            min_temp_index: DEFAULT_MIN_TEMP_INDEX,
            day_weather_index: DEFAULT_DAY_WEATHER_INDEX,
            night_weather_index: DEFAULT_NIGHT_WEATHER_INDEX,
        }
    }
}

impl ColumnLayout {
    /// Overlay whatever header discovery found; everything else stays as it was.
    pub fn merged_with(self, discovered: &DiscoveredLayout) -> Self {
        Self {
            max_temp_index: discovered.max_temp_index.unwrap_or(self.max_temp_index),
            min_temp_index: discovered.min_temp_index.unwrap_or(self.min_temp_index),
            day_weather_index: discovered
                .day_weather_index
                .unwrap_or(self.day_weather_index),
            night_weather_index: discovered
                .night_weather_index
                .unwrap_or(self.night_weather_index),
        }
    }
}

/// Result of header discovery; `None` means the header did not say
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveredLayout {
    pub max_temp_index: Option<usize>,
    pub min_temp_index: Option<usize>,
    pub day_weather_index: Option<usize>,
    pub night_weather_index: Option<usize>,
}

impl DiscoveredLayout {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let layout = ColumnLayout::default();
        assert_eq!(layout.max_temp_index, 7);
        assert_eq!(layout.min_temp_index, 8);
        assert_eq!(layout.day_weather_index, 19);
        assert_eq!(layout.night_weather_index, 20);
    }

    #[test]
    fn test_partial_merge() {
        let discovered = DiscoveredLayout {
            max_temp_index: Some(3),
            night_weather_index: Some(11),
            ..Default::default()
        };
        let layout = ColumnLayout::default().merged_with(&discovered);

        assert_eq!(layout.max_temp_index, 3);
        assert_eq!(layout.min_temp_index, 8);
        assert_eq!(layout.day_weather_index, 19);
        assert_eq!(layout.night_weather_index, 11);
        assert!(!discovered.is_empty());
        assert!(DiscoveredLayout::default().is_empty());
    }
}
