use crate::error::Result;
use crate::models::DailyRecord;
use std::io::Write;
use std::path::Path;

/// CSV export: `date,max_temp,min_temp[,precipitation]`
pub struct CsvWriter {
    include_precipitation: Option<bool>,
}

impl CsvWriter {
    /// The precipitation column is written when any record carries a classification
    pub fn new() -> Self {
        Self {
            include_precipitation: None,
        }
    }

    pub fn with_precipitation(include: bool) -> Self {
        Self {
            include_precipitation: Some(include),
        }
    }

    pub fn write_records(&self, records: &[DailyRecord], path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_to(records, file)
    }

    pub fn write_to<W: Write>(&self, records: &[DailyRecord], out: W) -> Result<()> {
        let precipitation = self
            .include_precipitation
            .unwrap_or_else(|| records.iter().any(|r| r.precipitation.is_some()));

        let mut writer = csv::Writer::from_writer(out);

        let mut header = vec!["date", "max_temp", "min_temp"];
        if precipitation {
            header.push("precipitation");
        }
        writer.write_record(&header)?;

        for record in records {
            let mut row = vec![
                record.date.format("%Y-%m-%d").to_string(),
                format_temp(record.max_temp),
                format_temp(record.min_temp),
            ];
            if precipitation {
                // dry days stay blank
                let label = record
                    .precipitation
                    .filter(|p| p.is_wet())
                    .map(|p| p.as_str())
                    .unwrap_or_default();
                row.push(label.to_string());
            }
            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }

    pub fn render(&self, records: &[DailyRecord]) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_to(records, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn format_temp(value: Option<f64>) -> String {
    value.map(|v| format!("{:.1}", v)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Precipitation;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn record(day: u32, max: Option<f64>, min: Option<f64>, p: Option<Precipitation>) -> DailyRecord {
        DailyRecord::new(NaiveDate::from_ymd_opt(2024, 1, day).unwrap(), max, min, p).unwrap()
    }

    #[test]
    fn test_csv_with_precipitation() {
        let records = vec![
            record(1, Some(10.2), Some(1.0), Some(Precipitation::None)),
            record(2, Some(8.0), None, Some(Precipitation::Rain)),
            record(3, None, Some(-2.5), Some(Precipitation::Snow)),
        ];

        let csv = CsvWriter::new().render(&records).unwrap();
        assert_eq!(
            csv,
            "date,max_temp,min_temp,precipitation\n\
             2024-01-01,10.2,1.0,\n\
             2024-01-02,8.0,,rain\n\
             2024-01-03,,-2.5,snow\n"
        );
    }

    #[test]
    fn test_csv_without_precipitation() {
        let records = vec![record(5, Some(3.0), Some(0.0), None)];

        let csv = CsvWriter::new().render(&records).unwrap();
        assert_eq!(csv, "date,max_temp,min_temp\n2024-01-05,3.0,0.0\n");

        let forced = CsvWriter::with_precipitation(true).render(&records).unwrap();
        assert_eq!(
            forced,
            "date,max_temp,min_temp,precipitation\n2024-01-05,3.0,0.0,\n"
        );
    }

    #[test]
    fn test_write_file() -> Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("tokyo_temp_2024_1.csv");

        CsvWriter::new().write_records(&[record(1, Some(1.0), None, None)], &path)?;

        let content = std::fs::read_to_string(&path)?;
        assert!(content.starts_with("date,max_temp,min_temp\n"));
        Ok(())
    }
}
