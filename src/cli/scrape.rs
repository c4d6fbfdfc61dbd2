use super::ui;
use crate::core::store::RatesStore;
use crate::pipeline::{IngestionPipeline, RunOutcome, RunReport};
use crate::scrapers::ScraperRegistry;
use anyhow::Result;
use comfy_table::Cell;

impl RunReport {
    pub fn display(&self) -> String {
        let mut output = format!(
            "Scrape: {} ({})\n",
            ui::style_text(&self.bank_name, ui::StyleType::Title),
            ui::styled_status(self.status)
        );

        match &self.outcome {
            RunOutcome::Aborted(reason) => {
                output.push_str(&format!(
                    "\n{}",
                    ui::style_text(&format!("Aborted: {reason}"), ui::StyleType::Error)
                ));
            }
            RunOutcome::Completed {
                rows,
                records_created,
                failures,
            } => {
                output.push_str(&format!(
                    "\nRows scraped: {rows}\nRecords created: {records_created}\nRows failed: {}",
                    failures.len()
                ));

                if !failures.is_empty() {
                    let mut table = ui::new_styled_table();
                    table.set_header(vec![
                        ui::header_cell("Row"),
                        ui::header_cell("Currency"),
                        ui::header_cell("Error"),
                    ]);
                    for failure in failures {
                        table.add_row(vec![
                            Cell::new(failure.index + 1),
                            Cell::new(failure.currency.as_deref().unwrap_or("N/A")),
                            Cell::new(failure.error.to_string()),
                        ]);
                    }
                    output.push_str(&format!("\n\n{table}"));
                }
            }
        }

        output
    }
}

/// Runs the pipeline for `bank` and prints its report. A failed scrape is
/// reported, not returned as an error.
pub async fn scrape(store: &dyn RatesStore, registry: &ScraperRegistry, bank: &str) -> Result<()> {
    let spinner = ui::new_spinner(&format!("Scraping {bank}"));
    let result = IngestionPipeline::new(store, registry).run(bank).await;
    spinner.finish_and_clear();

    let report = result?;
    println!("{}", report.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::core::error::{RowError, ScrapeFailure};
    use crate::core::model::LogStatus;
    use crate::pipeline::{RowFailure, RunOutcome, RunReport};
    use chrono::Utc;

    fn report(status: LogStatus, outcome: RunOutcome) -> RunReport {
        RunReport {
            bank_id: 1,
            bank_name: "NCBA".to_string(),
            started_at: Utc::now(),
            status,
            outcome,
        }
    }

    #[test]
    fn test_display_completed_run_lists_failures() {
        let output = report(
            LogStatus::Failure,
            RunOutcome::Completed {
                rows: 2,
                records_created: 2,
                failures: vec![RowFailure {
                    index: 1,
                    currency: Some("XYZ".to_string()),
                    error: RowError::CurrencyNotFound("XYZ".to_string()),
                }],
            },
        )
        .display();

        assert!(output.contains("NCBA"));
        assert!(output.contains("failure"));
        assert!(output.contains("Records created: 2"));
        assert!(output.contains("Currency 'XYZ' does not exist"));
    }

    #[test]
    fn test_display_aborted_run() {
        let output = report(
            LogStatus::Failure,
            RunOutcome::Aborted(ScrapeFailure::EmptyResult),
        )
        .display();

        assert!(output.contains("Aborted: Scraper returned no rows"));
        assert!(!output.contains("Records created"));
    }
}
