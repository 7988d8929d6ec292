use crate::error::{ProcessingError, Result};
use crate::models::{ColumnLayout, DailyRecord, DiscoveredLayout, Precipitation, StationQuery};
use crate::utils::constants::*;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use tracing::{debug, info};

static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse(DATA_TABLE_SELECTOR).expect("data table selector should parse"));
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("row selector should parse"));
static HEADER_CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th, td").expect("header cell selector should parse"));
static DATA_CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("data cell selector should parse"));

/// Turns one JMA daily-table page into daily temperature records
pub struct DailyTableReader {
    default_layout: ColumnLayout,
}

impl DailyTableReader {
    pub fn new() -> Self {
        Self {
            default_layout: ColumnLayout::default(),
        }
    }

    /// Use a different fallback layout for pages whose header cannot be read
    pub fn with_default_layout(default_layout: ColumnLayout) -> Self {
        Self { default_layout }
    }

    /// Extract the records of a saved page
    pub fn read_file(
        &self,
        path: &Path,
        query: &StationQuery,
        precipitation: bool,
    ) -> Result<Vec<DailyRecord>> {
        let bytes = std::fs::read(path)?;
        let html = decode_utf8(&bytes);
        self.extract(&html, query, precipitation)
    }

    /// Extract the records of a fetched page.
    ///
    /// Fails with `TableNotFound` when the document has no daily table and with
    /// `NoDataExtracted` when the table holds no usable row. Malformed rows are
    /// skipped.
    pub fn extract(
        &self,
        html: &str,
        query: &StationQuery,
        precipitation: bool,
    ) -> Result<Vec<DailyRecord>> {
        let document = Html::parse_document(html);
        let table = document
            .select(&TABLE_SELECTOR)
            .next()
            .ok_or(ProcessingError::TableNotFound)?;

        let rows: Vec<ElementRef> = table.select(&ROW_SELECTOR).collect();

        let header_rows: Vec<Vec<String>> = rows
            .iter()
            .filter(|row| row.value().classes().any(|c| c == HEADER_ROW_CLASS))
            .map(|row| cell_texts(row, &HEADER_CELL_SELECTOR))
            .collect();

        let layout = match header_rows.as_slice() {
            [group_labels, sub_labels, ..] => self
                .default_layout
                .merged_with(&discover_layout(group_labels, sub_labels)),
            _ => self.default_layout,
        };
        debug!(?layout, header_rows = header_rows.len(), "column layout");

        let mut records: Vec<DailyRecord> = rows
            .iter()
            .filter(|row| row.value().classes().any(|c| c.contains(DATA_ROW_CLASS)))
            .filter_map(|row| {
                let cells = cell_texts(row, &DATA_CELL_SELECTOR);
                parse_row(&cells, &layout, query, precipitation)
            })
            .collect();

        records.sort_by_key(|r| r.date);
        records.dedup_by_key(|r| r.date);

        if records.is_empty() {
            return Err(ProcessingError::NoDataExtracted {
                year: query.year,
                month: query.month,
            });
        }

        info!(
            station = %query.station_name,
            year = query.year,
            month = query.month,
            records = records.len(),
            "extracted daily records"
        );

        Ok(records)
    }
}

impl Default for DailyTableReader {
    fn default() -> Self {
        Self::new()
    }
}

fn cell_texts(row: &ElementRef, selector: &Selector) -> Vec<String> {
    row.select(selector)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}

/// Decode page bytes as UTF-8 whatever the page claims, replacing bad sequences
pub fn decode_utf8(bytes: &[u8]) -> String {
    let (text, _, _) = encoding_rs::UTF_8.decode(bytes);
    text.into_owned()
}

/// Locate the temperature and weather-summary columns from a two-row header.
///
/// Never fails: every position the header does not reveal is left as `None`.
pub fn discover_layout<S: AsRef<str>>(group_labels: &[S], sub_labels: &[S]) -> DiscoveredLayout {
    let mut discovered = DiscoveredLayout::default();

    let temp_col = group_labels.iter().position(|h| {
        let h = h.as_ref();
        h.contains(TEMP_GROUP_LABEL) && h.contains(TEMP_UNIT_LABEL)
    });

    if let Some(col) = temp_col.filter(|&col| sub_labels.len() > col) {
        let end = (col + TEMP_SCAN_WINDOW).min(sub_labels.len());
        for (i, label) in sub_labels.iter().enumerate().take(end).skip(col) {
            let label = label.as_ref();
            if label.contains(MAX_TEMP_LABEL) {
                discovered.max_temp_index = Some(i);
            }
            if label.contains(MIN_TEMP_LABEL) {
                discovered.min_temp_index = Some(i);
            }
        }
    }

    let weather_col = group_labels
        .iter()
        .position(|h| h.as_ref().contains(WEATHER_GROUP_LABEL));

    if let Some(col) = weather_col {
        for (i, label) in sub_labels.iter().enumerate().skip(col) {
            let label = label.as_ref();
            if label.contains(DAY_WEATHER_LABEL) {
                discovered.day_weather_index = Some(i);
            }
            if label.contains(NIGHT_WEATHER_LABEL) {
                discovered.night_weather_index = Some(i);
            }
        }
    }

    discovered
}

/// `None` for missing markers, unparseable text and non-finite values
pub fn parse_optional_float(text: &str) -> Option<f64> {
    let text = text.trim();
    if MISSING_MARKERS.contains(&text) {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Leading run of digits anywhere in the cell, e.g. "1" or "12日"
pub fn parse_day_of_month(text: &str) -> Option<u32> {
    let digits: String = text
        .chars()
        .skip_while(|c| digit_value(*c).is_none())
        .map_while(digit_value)
        .map(|d| char::from_digit(d, 10).unwrap_or('0'))
        .collect();

    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn digit_value(c: char) -> Option<u32> {
    c.to_digit(10).or_else(|| {
        ('０'..='９')
            .contains(&c)
            .then(|| c as u32 - '０' as u32)
    })
}

/// Snow (or sleet) wins over rain when both appear in the day and night text
pub fn classify_precipitation(day_weather: &str, night_weather: &str) -> Precipitation {
    let combined = format!("{day_weather}{night_weather}");

    if SNOW_TOKENS.iter().any(|t| combined.contains(t)) {
        Precipitation::Snow
    } else if RAIN_TOKENS.iter().any(|t| combined.contains(t)) {
        Precipitation::Rain
    } else {
        Precipitation::None
    }
}

fn parse_row(
    cells: &[String],
    layout: &ColumnLayout,
    query: &StationQuery,
    precipitation: bool,
) -> Option<DailyRecord> {
    if cells.len() < MIN_DATA_ROW_CELLS {
        return None;
    }

    let Some(day) = parse_day_of_month(&cells[0]) else {
        debug!(cell = %cells[0], "skipping row without a day number");
        return None;
    };

    let Some(date) = NaiveDate::from_ymd_opt(query.year, query.month, day) else {
        debug!(day, "skipping row with an impossible date");
        return None;
    };

    let cell = |index: usize| cells.get(index).map(String::as_str);
    let max_temp = cell(layout.max_temp_index).and_then(parse_optional_float);
    let min_temp = cell(layout.min_temp_index).and_then(parse_optional_float);

    let precipitation = precipitation.then(|| {
        classify_precipitation(
            cell(layout.day_weather_index).unwrap_or_default(),
            cell(layout.night_weather_index).unwrap_or_default(),
        )
    });

    let record = DailyRecord::new(date, max_temp, min_temp, precipitation);
    if record.is_none() {
        debug!(%date, "no temperature for day");
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn query(year: i32, month: u32) -> StationQuery {
        StationQuery {
            year,
            month,
            station_precip_id: 44,
            station_block_id: 47662,
            station_name: "Tokyo".to_string(),
        }
    }

    /// Twelve-column table: day, 3 pressure/precip columns, 最高, 最低, 平均,
    /// 2 humidity columns, 昼, 夜, padding
    fn page(rows: &[(&str, &str, &str, &str, &str)]) -> String {
        let mut html = String::from(
            r#"<html><body><table class="data2_s">
<tr class="mtx header"><th>日</th><th>気圧(hPa)</th><th>降水量(mm)</th><th>降水量(mm)</th>
<th>気温(℃)</th><th>気温(℃)</th><th>気温(℃)</th><th>湿度(％)</th><th>湿度(％)</th>
<th>天気概況</th><th>天気概況</th><th>備考</th></tr>
<tr class="mtx header"><th></th><th>現地</th><th>合計</th><th>最大</th>
<th>最高</th><th>最低</th><th>平均</th><th>平均</th><th>最小</th>
<th>昼(06:00-18:00)</th><th>夜(18:00-翌日06:00)</th><th></th></tr>
"#,
        );
        for (day, max, min, day_weather, night_weather) in rows {
            html.push_str(&format!(
                "<tr class=\"mtx\" style=\"text-align:right;\"><td><div class=\"a_print\"><a href=\"#\">{day}</a></div></td>\
                 <td>1013.2</td><td>0.0</td><td>0.0</td><td>{max}</td><td>{min}</td><td>5.0</td>\
                 <td>60</td><td>30</td><td>{day_weather}</td><td>{night_weather}</td><td></td></tr>\n"
            ));
        }
        html.push_str("</table></body></html>");
        html
    }

    #[test]
    fn test_discover_layout_two_row_header() {
        let groups = ["日", "気圧(hPa)", "気温(℃)", "気温(℃)", "気温(℃)", "天気概況", "天気概況"];
        let subs = ["", "現地", "平均", "最高", "最低", "昼(06:00-18:00)", "夜(18:00-翌日06:00)"];

        let discovered = discover_layout(&groups, &subs);
        assert_eq!(
            discovered,
            DiscoveredLayout {
                max_temp_index: Some(3),
                min_temp_index: Some(4),
                day_weather_index: Some(5),
                night_weather_index: Some(6),
            }
        );
    }

    #[test]
    fn test_discover_layout_scan_window_is_bounded() {
        let mut groups = vec!["気温(℃)".to_string()];
        groups.extend((0..11).map(|_| String::new()));
        let mut subs: Vec<String> = (0..10).map(|i| format!("列{i}")).collect();
        subs.push("最高".to_string());
        subs.push("最低".to_string());

        let discovered = discover_layout(&groups, &subs);
        assert_eq!(discovered.max_temp_index, None);
        assert_eq!(discovered.min_temp_index, None);
    }

    #[test]
    fn test_discover_layout_tolerates_garbage() {
        let empty: [&str; 0] = [];
        assert!(discover_layout(&empty, &empty).is_empty());

        // temperature group beyond the end of the sub-label row
        let groups = ["日", "気温(℃)"];
        let subs = ["最高"];
        assert!(discover_layout(&groups, &subs).is_empty());

        // label without the unit is not the temperature group
        let groups = ["気温", "気温"];
        let subs = ["最高", "最低"];
        assert!(discover_layout(&groups, &subs).is_empty());
    }

    #[test]
    fn test_parse_optional_float() {
        assert_eq!(parse_optional_float("12.5"), Some(12.5));
        assert_eq!(parse_optional_float(" -3.0 "), Some(-3.0));
        assert_eq!(parse_optional_float("//"), None);
        assert_eq!(parse_optional_float("--"), None);
        assert_eq!(parse_optional_float(""), None);
        assert_eq!(parse_optional_float("12.5 )"), None);
        assert_eq!(parse_optional_float("×"), None);
        assert_eq!(parse_optional_float("NaN"), None);
    }

    #[test]
    fn test_parse_day_of_month() {
        assert_eq!(parse_day_of_month("1"), Some(1));
        assert_eq!(parse_day_of_month("31日"), Some(31));
        assert_eq!(parse_day_of_month("日付 7"), Some(7));
        assert_eq!(parse_day_of_month("１５"), Some(15));
        assert_eq!(parse_day_of_month("合計"), None);
        assert_eq!(parse_day_of_month(""), None);
    }

    #[test]
    fn test_classify_precipitation() {
        assert_eq!(classify_precipitation("晴", "曇"), Precipitation::None);
        assert_eq!(classify_precipitation("曇一時雨", "晴"), Precipitation::Rain);
        assert_eq!(classify_precipitation("晴", "みぞれ"), Precipitation::Snow);
        assert_eq!(classify_precipitation("雨後雪", ""), Precipitation::Snow);
        assert_eq!(classify_precipitation("雨", "雪"), Precipitation::Snow);
    }

    #[test]
    fn test_extract_month() {
        let html = page(&[
            ("1", "10.2", "1.5", "晴", "曇"),
            ("2", "8.0", "--", "雨", "曇"),
            ("3", "--", "--", "雪", "雪"),
            ("4", "//", "-1.0", "曇後雪", "雨"),
        ]);

        let records = DailyTableReader::new()
            .extract(&html, &query(2024, 1), true)
            .unwrap();

        assert_eq!(records.len(), 3);

        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(records[0].max_temp, Some(10.2));
        assert_eq!(records[0].min_temp, Some(1.5));
        assert_eq!(records[0].precipitation, Some(Precipitation::None));

        assert_eq!(records[1].min_temp, None);
        assert_eq!(records[1].precipitation, Some(Precipitation::Rain));

        assert_eq!(records[2].date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
        assert_eq!(records[2].max_temp, None);
        assert_eq!(records[2].precipitation, Some(Precipitation::Snow));
    }

    #[test]
    fn test_precipitation_not_requested() {
        let html = page(&[("1", "10.2", "1.5", "雨", "雨")]);
        let records = DailyTableReader::new()
            .extract(&html, &query(2024, 1), false)
            .unwrap();
        assert_eq!(records[0].precipitation, None);
    }

    #[test]
    fn test_table_not_found() {
        let html = "<html><body><table class=\"data\"><tr><td>1</td></tr></table></body></html>";
        let err = DailyTableReader::new()
            .extract(html, &query(2024, 1), false)
            .unwrap_err();
        assert!(matches!(err, ProcessingError::TableNotFound));
    }

    #[test]
    fn test_no_data_extracted() {
        let html = page(&[("1", "--", "--", "", ""), ("2", "//", "", "", "")]);
        let err = DailyTableReader::new()
            .extract(&html, &query(2024, 3), false)
            .unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::NoDataExtracted { year: 2024, month: 3 }
        ));
    }

    #[test]
    fn test_impossible_dates_are_skipped() {
        let html = page(&[("29", "5.0", "1.0", "", ""), ("30", "6.0", "2.0", "", "")]);
        let err = DailyTableReader::new()
            .extract(&html, &query(2023, 2), false)
            .unwrap_err();
        assert!(matches!(err, ProcessingError::NoDataExtracted { .. }));

        let leap = DailyTableReader::new()
            .extract(&html, &query(2024, 2), false)
            .unwrap();
        assert_eq!(leap.len(), 1);
    }

    #[test]
    fn test_out_of_order_and_duplicate_rows() {
        let html = page(&[
            ("3", "3.0", "0.0", "", ""),
            ("1", "1.0", "0.0", "", ""),
            ("3", "99.0", "0.0", "", ""),
        ]);
        let records = DailyTableReader::new()
            .extract(&html, &query(2024, 1), false)
            .unwrap();

        let days: Vec<_> = records.iter().map(|r| r.max_temp).collect();
        assert_eq!(days, vec![Some(1.0), Some(3.0)]);
    }

    #[test]
    fn test_fallback_layout_without_header() {
        // no header rows: values at the default positions 7 and 8
        let html = r#"<table class="data2_s">
<tr class="mtx"><td>5</td><td></td><td></td><td></td><td></td><td></td><td></td><td>12.0</td><td>4.0</td></tr>
<tr class="mtx"><td>6</td><td></td><td></td><td></td><td></td><td></td><td></td><td>11.0</td></tr>
<tr class="mtx"><td>7</td><td>x</td><td>x</td></tr>
</table>"#;
        let records = DailyTableReader::new()
            .extract(html, &query(2024, 5), true)
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].max_temp, Some(12.0));
        assert_eq!(records[0].min_temp, Some(4.0));
        assert_eq!(records[1].min_temp, None);
        // weather cells out of range count as no precipitation
        assert_eq!(records[1].precipitation, Some(Precipitation::None));
    }

    #[test]
    fn test_custom_default_layout() {
        let layout = ColumnLayout {
            max_temp_index: 1,
            min_temp_index: 2,
            day_weather_index: 3,
            night_weather_index: 4,
        };
        let html = r#"<table class="data2_s">
<tr class="mtx"><td>9</td><td>20.5</td><td>15.5</td><td>雨</td><td>晴</td></tr>
</table>"#;
        let records = DailyTableReader::with_default_layout(layout)
            .extract(html, &query(2024, 6), true)
            .unwrap();
        assert_eq!(records[0].max_temp, Some(20.5));
        assert_eq!(records[0].precipitation, Some(Precipitation::Rain));
    }

    #[test]
    fn test_decode_utf8_replaces_bad_bytes() {
        let bytes = [0xe6, 0x9d, 0xb1, 0xff, b'A'];
        let text = decode_utf8(&bytes);
        assert!(text.starts_with('東'));
        assert!(text.ends_with('A'));
    }

    #[test]
    fn test_read_file() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("daily.html");
        std::fs::write(&path, page(&[("1", "10.0", "2.0", "晴", "晴")]))?;

        let records = DailyTableReader::new().read_file(&path, &query(2024, 1), false)?;
        assert_eq!(records.len(), 1);
        Ok(())
    }
}
