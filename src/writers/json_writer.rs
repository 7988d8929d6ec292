use crate::error::Result;
use crate::models::DailyRecord;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write records as a pretty-printed JSON array
pub fn write_json(records: &[DailyRecord], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

pub fn read_json(path: &Path) -> Result<Vec<DailyRecord>> {
    let file = std::fs::File::open(path)?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}
