pub mod integrity_checker;
pub mod monthly_processor;

pub use integrity_checker::{IntegrityChecker, IntegrityReport, TemperatureViolation, ViolationType};
pub use monthly_processor::{MonthOutcome, MonthlyProcessor, RangeReport};
