use crate::error::{QrsError, Result};
use edf::Reader;

/// Renders the EDF header, signal header and data block of `file_path`.
pub fn describe_edf(file_path: &str) -> Result<String> {
    let edf_file = Reader::from_path(file_path).map_err(|e| QrsError::Edf(e.to_string()))?;

    Ok(format!(
        "{}\nStart datetime: {}\n{}\n##data\n{}",
        edf_file.header, edf_file.header.start_datetime, edf_file.signal_header, edf_file.data
    ))
}
