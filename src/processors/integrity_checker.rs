use crate::models::{DailyRecord, YearMonth};
use crate::utils::constants::{MAX_VALID_TEMP, MIN_VALID_TEMP, TEMP_JUMP_THRESHOLD, TEMP_TOLERANCE};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone)]
pub struct IntegrityReport {
    pub total_records: usize,
    pub complete_records: usize,
    pub partial_records: usize,
    pub temperature_violations: Vec<TemperatureViolation>,
    pub missing_days: Vec<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct TemperatureViolation {
    pub date: NaiveDate,
    pub violation_type: ViolationType,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationType {
    MaxBelowMin,
    OutOfRange,
    SuspiciousJump,
}

pub struct IntegrityChecker {
    temperature_jump_threshold: f64,
}

impl IntegrityChecker {
    pub fn new() -> Self {
        Self {
            temperature_jump_threshold: TEMP_JUMP_THRESHOLD,
        }
    }

    pub fn with_jump_threshold(threshold: f64) -> Self {
        Self {
            temperature_jump_threshold: threshold,
        }
    }

    /// Check extracted records; problems are reported, never raised
    pub fn check_integrity(&self, records: &[DailyRecord]) -> IntegrityReport {
        let mut report = IntegrityReport {
            total_records: records.len(),
            complete_records: 0,
            partial_records: 0,
            temperature_violations: Vec::new(),
            missing_days: Vec::new(),
        };

        let mut sorted: Vec<&DailyRecord> = records.iter().collect();
        sorted.sort_by_key(|r| r.date);

        for record in &sorted {
            if record.is_complete() {
                report.complete_records += 1;
            } else {
                report.partial_records += 1;
            }
            self.check_record(record, &mut report);
        }

        self.check_time_series(&sorted, &mut report);
        report.missing_days = missing_days(&sorted);

        report
    }

    fn check_record(&self, record: &DailyRecord, report: &mut IntegrityReport) {
        if let (Some(max), Some(min)) = (record.max_temp, record.min_temp) {
            if max + TEMP_TOLERANCE < min {
                report.temperature_violations.push(TemperatureViolation {
                    date: record.date,
                    violation_type: ViolationType::MaxBelowMin,
                    details: format!("max temperature {} is below min temperature {}", max, min),
                });
            }
        }

        let temps = [(record.max_temp, "max"), (record.min_temp, "min")];
        for (temp, name) in temps {
            if let Some(temp) = temp {
                if !(MIN_VALID_TEMP..=MAX_VALID_TEMP).contains(&temp) {
                    report.temperature_violations.push(TemperatureViolation {
                        date: record.date,
                        violation_type: ViolationType::OutOfRange,
                        details: format!(
                            "{} temperature {} is outside valid range [{}, {}]",
                            name, temp, MIN_VALID_TEMP, MAX_VALID_TEMP
                        ),
                    });
                }
            }
        }
    }

    /// Day-over-day jumps between consecutive dates
    fn check_time_series(&self, records: &[&DailyRecord], report: &mut IntegrityReport) {
        for window in records.windows(2) {
            let prev = window[0];
            let curr = window[1];

            if (curr.date - prev.date).num_days() != 1 {
                continue;
            }

            let temps = [
                (prev.max_temp, curr.max_temp, "max"),
                (prev.min_temp, curr.min_temp, "min"),
            ];

            for (prev_temp, curr_temp, name) in temps {
                if let (Some(prev_temp), Some(curr_temp)) = (prev_temp, curr_temp) {
                    let jump = (curr_temp - prev_temp).abs();

                    if jump > self.temperature_jump_threshold {
                        report.temperature_violations.push(TemperatureViolation {
                            date: curr.date,
                            violation_type: ViolationType::SuspiciousJump,
                            details: format!(
                                "{} temperature jumped {:.1}°C from {} to {}",
                                name, jump, prev.date, curr.date
                            ),
                        });
                    }
                }
            }
        }
    }

    /// Generate a summary report
    pub fn generate_summary(&self, report: &IntegrityReport) -> String {
        let mut summary = String::new();
        let pct = |n: usize| {
            if report.total_records == 0 {
                0.0
            } else {
                100.0 * n as f64 / report.total_records as f64
            }
        };

        summary.push_str("=== Integrity Check Report ===\n");
        summary.push_str(&format!("Total Records: {}\n", report.total_records));
        summary.push_str(&format!(
            "Complete Records: {} ({:.1}%)\n",
            report.complete_records,
            pct(report.complete_records)
        ));
        summary.push_str(&format!(
            "Partial Records: {} ({:.1}%)\n",
            report.partial_records,
            pct(report.partial_records)
        ));
        summary.push_str(&format!("Missing Days: {}\n", report.missing_days.len()));
        if !report.missing_days.is_empty() {
            let days: Vec<String> = report.missing_days.iter().map(|d| d.to_string()).collect();
            summary.push_str(&format!("  {}\n", days.join(", ")));
        }
        summary.push_str(&format!(
            "\nTemperature Violations: {}\n",
            report.temperature_violations.len()
        ));

        if !report.temperature_violations.is_empty() {
            summary.push_str("\nTop 10 Violations:\n");
            for (i, violation) in report.temperature_violations.iter().take(10).enumerate() {
                summary.push_str(&format!(
                    "  {}. {}: {}\n",
                    i + 1,
                    violation.date,
                    violation.details
                ));
            }
        }

        summary
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}

/// Days of every covered month that have no record
fn missing_days(records: &[&DailyRecord]) -> Vec<NaiveDate> {
    let present: HashSet<NaiveDate> = records.iter().map(|r| r.date).collect();
    let months: BTreeSet<YearMonth> = records.iter().map(|r| YearMonth::of(r.date)).collect();

    months
        .iter()
        .flat_map(|m| m.days())
        .filter(|d| !present.contains(d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(day: u32, max: Option<f64>, min: Option<f64>) -> DailyRecord {
        DailyRecord::new(NaiveDate::from_ymd_opt(2024, 2, day).unwrap(), max, min, None).unwrap()
    }

    #[test]
    fn test_clean_month() {
        let records: Vec<DailyRecord> = (1..=29)
            .map(|d| record(d, Some(10.0 + d as f64 * 0.1), Some(2.0)))
            .collect();

        let checker = IntegrityChecker::new();
        let report = checker.check_integrity(&records);

        assert_eq!(report.total_records, 29);
        assert_eq!(report.complete_records, 29);
        assert!(report.temperature_violations.is_empty());
        assert!(report.missing_days.is_empty());
    }

    #[test]
    fn test_violations_and_gaps() {
        let records = vec![
            record(1, Some(5.0), Some(8.0)),
            record(2, Some(60.0), None),
            record(3, Some(30.0), Some(1.0)),
            record(5, Some(4.0), Some(0.0)),
        ];

        let checker = IntegrityChecker::new();
        let report = checker.check_integrity(&records);

        let kinds: Vec<ViolationType> = report
            .temperature_violations
            .iter()
            .map(|v| v.violation_type)
            .collect();

        assert!(kinds.contains(&ViolationType::MaxBelowMin));
        assert!(kinds.contains(&ViolationType::OutOfRange));
        // 5.0 -> 60.0 and 60.0 -> 30.0 are both jumps; 3rd -> 5th is not consecutive
        assert_eq!(
            kinds
                .iter()
                .filter(|k| **k == ViolationType::SuspiciousJump)
                .count(),
            2
        );

        assert_eq!(report.partial_records, 1);
        assert_eq!(report.missing_days.len(), 25);
        assert_eq!(report.missing_days[0], NaiveDate::from_ymd_opt(2024, 2, 4).unwrap());

        let summary = checker.generate_summary(&report);
        assert!(summary.contains("Missing Days: 25"));
        assert!(summary.contains("Top 10 Violations"));
    }

    #[test]
    fn test_empty_input() {
        let checker = IntegrityChecker::with_jump_threshold(5.0);
        let report = checker.check_integrity(&[]);
        assert_eq!(report.total_records, 0);
        assert!(checker.generate_summary(&report).contains("Total Records: 0"));
    }
}
