//! CSV export of the publication matrix

use std::fs::File;
use std::io::Write;
use std::path::Path;

use time::OffsetDateTime;
use tracing::info;

use crate::error::{PubMedError, Result};
use crate::trends::PublicationMatrix;

impl PublicationMatrix {
    /// Write `Year,<manufacturers...>,Total`, one row per year and a `Total` row
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut header = Vec::with_capacity(self.manufacturers.len() + 2);
        header.push("Year".to_string());
        header.extend(self.manufacturers.iter().cloned());
        header.push("Total".to_string());
        csv_writer.write_record(&header)?;

        for &year in &self.years {
            let mut row = Vec::with_capacity(header.len());
            row.push(year.to_string());
            for manufacturer in &self.manufacturers {
                row.push(self.count(year, manufacturer).to_string());
            }
            row.push(self.year_total(year).to_string());
            csv_writer.write_record(&row)?;
        }

        let mut totals = Vec::with_capacity(header.len());
        totals.push("Total".to_string());
        for manufacturer in &self.manufacturers {
            totals.push(self.manufacturer_total(manufacturer).to_string());
        }
        totals.push(self.grand_total().to_string());
        csv_writer.write_record(&totals)?;

        csv_writer.flush()?;
        Ok(())
    }

    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| PubMedError::IoError {
            message: format!("CSV output is not UTF-8: {e}"),
        })
    }

    /// Write the CSV to `path`
    pub fn save_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        self.write_csv(file)?;
        info!(path = %path.display(), rows = self.years.len(), "Exported publication matrix");
        Ok(())
    }
}

/// `pubmed_results_YYYYMMDD_HHMMSS.csv`
pub fn export_file_name(at: OffsetDateTime) -> String {
    format!(
        "pubmed_results_{:04}{:02}{:02}_{:02}{:02}{:02}.csv",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

/// Export file name for the current local time (UTC when the offset is unknown)
pub fn export_file_name_now() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    export_file_name(now)
}
