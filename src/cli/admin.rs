use crate::core::model::EntityRef;
use crate::core::store::RatesStore;
use anyhow::{Context, Result};
use tracing::info;

/// Soft-deletes a bank, currency or record.
pub async fn remove(store: &dyn RatesStore, entity: EntityRef) -> Result<()> {
    let deleted_at = store
        .remove(entity)
        .await
        .with_context(|| format!("Failed to remove {entity}"))?;
    info!(%entity, %deleted_at, "Removed");
    println!("Removed {entity} at {}", deleted_at.to_rfc3339());
    Ok(())
}

pub async fn restore(store: &dyn RatesStore, entity: EntityRef) -> Result<()> {
    store
        .restore(entity)
        .await
        .with_context(|| format!("Failed to restore {entity}"))?;
    info!(%entity, "Restored");
    println!("Restored {entity}");
    Ok(())
}
