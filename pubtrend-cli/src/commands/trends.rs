use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::Datelike;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use pubtrend::{export_file_name_now, PublicationMatrix, SearchService};

use super::{create_pubtrend_client, load_registry, log_notices};

#[derive(Args, Debug)]
pub struct Trends {
    /// Topic searched for every manufacturer (e.g. "insulin pump")
    #[arg(value_name = "TOPIC")]
    topic: String,

    /// Manufacturers to count, comma separated
    #[arg(short, long, value_delimiter = ',', required = true)]
    manufacturers: Vec<String>,

    /// First year of the range
    #[arg(long)]
    start_year: i32,

    /// Last year of the range (default: current year)
    #[arg(long)]
    end_year: Option<i32>,

    /// Write the matrix as CSV; a directory gets a timestamped file name
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl Trends {
    pub async fn execute_with_config(
        &self,
        api_key: Option<&str>,
        email: Option<&str>,
        tool: &str,
        company_config: &Path,
    ) -> Result<()> {
        let end_year = self.end_year.unwrap_or_else(current_year);
        let registry = load_registry(company_config)?;

        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({msg})")
                .context("Failed to set progress bar style")?
                .progress_chars("#>-"),
        );
        pb.set_message("Counting publications");

        let progress = pb.clone();
        let client = create_pubtrend_client(api_key, email, tool).with_progress_callback(
            move |done, total, status| {
                progress.set_length(total as u64);
                progress.set_position(done as u64);
                progress.set_message(status.to_string());
            },
        );
        let service = SearchService::new(client, registry);

        let view = service
            .publication_trends(&self.topic, &self.manufacturers, self.start_year, end_year)
            .await;
        pb.finish_and_clear();
        log_notices(&view.notices);

        let Some(matrix) = view.matrix else {
            bail!("No publication counts for {:?}", self.topic);
        };

        print!("{}", render_matrix(&matrix));

        if let Some(ref output) = self.output {
            let path = resolve_output_path(output);
            matrix
                .save_csv(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "Matrix saved to CSV");
        }

        Ok(())
    }
}

fn current_year() -> i32 {
    chrono::Local::now().year()
}

fn resolve_output_path(output: &Path) -> PathBuf {
    if output.is_dir() {
        output.join(export_file_name_now())
    } else {
        output.to_path_buf()
    }
}

/// Plain-text table with a total column and a total row
fn render_matrix(matrix: &PublicationMatrix) -> String {
    let mut header = vec!["Year".to_string()];
    header.extend(matrix.manufacturers.iter().cloned());
    header.push("Total".to_string());

    let mut rows = vec![header];
    for &year in &matrix.years {
        let mut row = vec![year.to_string()];
        row.extend(
            matrix
                .manufacturers
                .iter()
                .map(|m| matrix.count(year, m).to_string()),
        );
        row.push(matrix.year_total(year).to_string());
        rows.push(row);
    }
    let mut totals = vec!["Total".to_string()];
    totals.extend(
        matrix
            .manufacturers
            .iter()
            .map(|m| matrix.manufacturer_total(m).to_string()),
    );
    totals.push(matrix.grand_total().to_string());
    rows.push(totals);

    let columns = rows[0].len();
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            rows.iter()
                .map(|row| row[col].chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for row in &rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(col, (cell, width))| {
                if col == 0 {
                    format!("{cell:<width$}")
                } else {
                    format!("{cell:>width$}")
                }
            })
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
    }
    out
}
