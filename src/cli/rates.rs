use super::ui;
use crate::core::rates::{BankRates, bank_currency_rates};
use crate::core::store::RatesStore;
use anyhow::Result;
use comfy_table::Cell;

pub fn display_rates(banks: &[BankRates]) -> String {
    let mut sections = Vec::new();

    for bank in banks {
        let mut output = format!(
            "Bank: {}\n\n",
            ui::style_text(&bank.name, ui::StyleType::Title)
        );

        if bank.currencies.is_empty() {
            output.push_str(&ui::style_text("No rates recorded yet", ui::StyleType::Subtle));
            sections.push(output);
            continue;
        }

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Currency"),
            ui::header_cell("Name"),
            ui::header_cell("Buy"),
            ui::header_cell("Sell"),
        ]);
        for currency in &bank.currencies {
            table.add_row(vec![
                Cell::new(&currency.short_name),
                Cell::new(&currency.name),
                ui::format_optional_cell(currency.buy.as_ref(), |r| r.value.to_string()),
                ui::format_optional_cell(currency.sell.as_ref(), |r| r.value.to_string()),
            ]);
        }
        output.push_str(&table.to_string());
        sections.push(output);
    }

    sections.join("\n\n")
}

/// Prints the latest rates of every bank, as tables or as JSON.
pub async fn rates(store: &dyn RatesStore, json: bool) -> Result<()> {
    let banks = bank_currency_rates(store).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&banks)?);
    } else if banks.is_empty() {
        println!("No banks found. Run `fxrates seed` first.");
    } else {
        println!("{}", display_rates(&banks));
    }
    Ok(())
}
