//! Spectrum CSV export

use crate::summary::format_value;
use crate::ReportError;
use inference_engine::SpectrumPoint;
use tracing::debug;

/// Download name offered to the user
pub const CSV_FILE_NAME: &str = "PSAs.csv";
/// Content type of the download
pub const CSV_MIME: &str = "text/csv";

/// Serialize the spectrum as `,PSAs,T` rows (unnamed index column first).
pub fn spectrum_csv(spectrum: &[SpectrumPoint]) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(["", "PSAs", "T"])
        .map_err(|e| ReportError::Csv(e.to_string()))?;

    for (index, point) in spectrum.iter().enumerate() {
        writer
            .write_record([
                index.to_string(),
                format_value(point.psa),
                format_value(point.period),
            ])
            .map_err(|e| ReportError::Csv(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Csv(e.to_string()))?;
    debug!("Exported {} spectrum rows ({} bytes)", spectrum.len(), bytes.len());
    Ok(bytes)
}
