pub mod daily_table_reader;
pub mod page_fetcher;

pub use daily_table_reader::{
    classify_precipitation, discover_layout, parse_day_of_month, parse_optional_float,
    DailyTableReader,
};
pub use page_fetcher::{build_month_url, PageFetcher};
