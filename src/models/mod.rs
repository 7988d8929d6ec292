pub mod daily;
pub mod layout;
pub mod period;
pub mod station;

pub use daily::{DailyRecord, Precipitation};
pub use layout::{ColumnLayout, DiscoveredLayout};
pub use period::YearMonth;
pub use station::{builtin_stations, StationCatalog, StationMetadata, StationQuery};
