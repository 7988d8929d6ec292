/// JMA daily-table page (per station, per month)
pub const JMA_DAILY_URL: &str = "https://www.data.jma.go.jp/obd/stats/etrn/view/daily_s1.php";

/// Structural markers in the daily-table document
pub const DATA_TABLE_SELECTOR: &str = "table.data2_s";
pub const HEADER_ROW_CLASS: &str = "header";
pub const DATA_ROW_CLASS: &str = "mtx";

/// Header labels used for column discovery
pub const TEMP_GROUP_LABEL: &str = "気温";
pub const TEMP_UNIT_LABEL: &str = "℃";
pub const MAX_TEMP_LABEL: &str = "最高";
pub const MIN_TEMP_LABEL: &str = "最低";
pub const WEATHER_GROUP_LABEL: &str = "天気概況";
pub const DAY_WEATHER_LABEL: &str = "昼";
pub const NIGHT_WEATHER_LABEL: &str = "夜";

/// Sub-label columns scanned to the right of the temperature group
pub const TEMP_SCAN_WINDOW: usize = 10;

/// Default cell positions when the header does not say otherwise
pub const DEFAULT_MAX_TEMP_INDEX: usize = 7;
pub const DEFAULT_MIN_TEMP_INDEX: usize = 8;
pub const DEFAULT_DAY_WEATHER_INDEX: usize = 19;
pub const DEFAULT_NIGHT_WEATHER_INDEX: usize = 20;

/// Data rows shorter than this are decoration, not days
pub const MIN_DATA_ROW_CELLS: usize = 5;

/// Cell contents meaning "no observation"
pub const MISSING_MARKERS: [&str; 3] = ["//", "--", ""];

/// Weather-summary tokens
pub const SNOW_TOKENS: [&str; 2] = ["雪", "みぞれ"];
pub const RAIN_TOKENS: [&str; 1] = ["雨"];

/// Temperature constraints
pub const MIN_VALID_TEMP: f64 = -50.0;
pub const MAX_VALID_TEMP: f64 = 50.0;
pub const TEMP_TOLERANCE: f64 = 0.1;
pub const TEMP_JUMP_THRESHOLD: f64 = 20.0;

/// Fetch defaults
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("jma-processor/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_MAX_CONCURRENT: usize = 2;

/// Processing defaults
pub const DEFAULT_ROW_GROUP_SIZE: usize = 10000;
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Parquet compression options
pub const COMPRESSION_SNAPPY: &str = "snappy";
pub const COMPRESSION_GZIP: &str = "gzip";
pub const COMPRESSION_LZ4: &str = "lz4";
pub const COMPRESSION_ZSTD: &str = "zstd";
pub const COMPRESSION_NONE: &str = "none";
