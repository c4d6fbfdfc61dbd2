use super::ui;
use crate::core::model::AggregatorLog;
use crate::core::store::RatesStore;
use anyhow::{Result, anyhow};
use comfy_table::Cell;
use std::collections::HashMap;

pub fn display_logs(logs: &[AggregatorLog], bank_names: &HashMap<u64, String>) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Id"),
        ui::header_cell("Bank"),
        ui::header_cell("Type"),
        ui::header_cell("Status"),
        ui::header_cell("Created"),
    ]);

    for log in logs {
        let bank = bank_names
            .get(&log.bank_id)
            .cloned()
            .unwrap_or_else(|| format!("#{}", log.bank_id));
        table.add_row(vec![
            Cell::new(log.id),
            Cell::new(bank),
            Cell::new(log.kind.to_string()),
            ui::status_cell(log.status),
            Cell::new(log.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
        ]);
    }

    table.to_string()
}

/// Prints the aggregator log, optionally for a single bank.
pub async fn logs(store: &dyn RatesStore, bank: Option<&str>) -> Result<()> {
    let bank_id = match bank {
        Some(name) => Some(
            store
                .find_bank_by_name(name)
                .await?
                .ok_or_else(|| anyhow!("Bank with name '{}' does not exist", name))?
                .id,
        ),
        None => None,
    };

    let logs = store.list_logs(bank_id).await?;
    if logs.is_empty() {
        println!("No scrape runs recorded yet.");
        return Ok(());
    }

    let bank_names = store
        .list_banks()
        .await?
        .into_iter()
        .map(|b| (b.id, b.name))
        .collect();
    println!("{}", display_logs(&logs, &bank_names));
    Ok(())
}
