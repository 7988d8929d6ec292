use crate::models::YearMonth;
use std::path::{Path, PathBuf};

/// Default export path for one month: `{station}_temp_{year}_{month}.{ext}`
pub fn generate_default_month_filename(
    output_dir: &Path,
    station_key: &str,
    month: YearMonth,
    extension: &str,
) -> PathBuf {
    let filename = format!(
        "{}_temp_{}_{}.{}",
        station_key, month.year, month.month, extension
    );
    output_dir.join(filename)
}

/// Default export path for a range: `{station}_temp_{YYYY-MM}_{YYYY-MM}.{ext}`
pub fn generate_default_range_filename(
    output_dir: &Path,
    station_key: &str,
    start: YearMonth,
    end: YearMonth,
    extension: &str,
) -> PathBuf {
    let filename = format!("{}_temp_{}_{}.{}", station_key, start, end, extension);
    output_dir.join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_month_filename() {
        let month = YearMonth::new(2024, 3).unwrap();
        let filename = generate_default_month_filename(Path::new("output"), "tokyo", month, "csv");
        assert_eq!(filename, PathBuf::from("output/tokyo_temp_2024_3.csv"));
    }

    #[test]
    fn test_generate_default_range_filename() {
        let start = YearMonth::new(2023, 11).unwrap();
        let end = YearMonth::new(2024, 2).unwrap();
        let filename =
            generate_default_range_filename(Path::new("out"), "sapporo", start, end, "parquet");
        assert_eq!(
            filename,
            PathBuf::from("out/sapporo_temp_2023-11_2024-02.parquet")
        );
    }
}
