use backend_domain::{Container, ContainerSummary, InventoryRecord, InventoryValue, UserId};
use tracing::error;

use crate::enrichment::{load_quotes, priced_hash_names, record_value};
use crate::{AppError, AppState};

/// Tradeable value of the active inventory and of every container.
pub async fn inventory_value(state: &AppState, user: &UserId) -> Result<InventoryValue, AppError> {
    let active = state
        .inventory_repo
        .find_active_inventory(user)
        .await
        .map_err(|err| {
            error!(user = %user, "failed to load active inventory: {}", err);
            AppError::Internal(err)
        })?;
    let contents = load_container_contents(state, user).await?;

    let names = active
        .iter()
        .chain(contents.iter().flat_map(|(_, records)| records.iter()))
        .flat_map(|r| priced_hash_names(&r.hash_name, &r.stickers, r.keychain.as_ref()))
        .collect::<Vec<_>>();
    let quotes = load_quotes(state, names).await;

    let active_value: f64 = active.iter().map(|r| record_value(r, &quotes)).sum();
    let containers: Vec<ContainerSummary> = contents
        .into_iter()
        .map(|(container, records)| {
            let value = records.iter().map(|r| record_value(r, &quotes)).sum();
            summarize(container, &records, value)
        })
        .collect();
    let total_value = active_value + containers.iter().map(|c| c.value).sum::<f64>();

    Ok(InventoryValue {
        active_count: active.len() as u32,
        active_value,
        containers,
        total_value,
    })
}

/// Containers with their value and actual versus marketplace-reported counts.
pub async fn list_containers(state: &AppState, user: &UserId) -> Result<Vec<ContainerSummary>, AppError> {
    Ok(inventory_value(state, user).await?.containers)
}

pub async fn container_contents(
    state: &AppState,
    user: &UserId,
    container_id: i64,
) -> Result<Vec<InventoryRecord>, AppError> {
    let container = state
        .inventory_repo
        .find_container(container_id)
        .await
        .map_err(AppError::Internal)?;
    match container {
        Some(container) if &container.user_id == user => state
            .inventory_repo
            .find_container_contents(container_id)
            .await
            .map_err(AppError::Internal),
        _ => Err(AppError::NotFound(format!("container {}", container_id))),
    }
}

async fn load_container_contents(
    state: &AppState,
    user: &UserId,
) -> Result<Vec<(Container, Vec<InventoryRecord>)>, AppError> {
    let containers = state
        .inventory_repo
        .list_containers(user)
        .await
        .map_err(|err| {
            error!(user = %user, "failed to list containers: {}", err);
            AppError::Internal(err)
        })?;

    let mut grouped = Vec::with_capacity(containers.len());
    for container in containers {
        let records = state
            .inventory_repo
            .find_container_contents(container.id)
            .await
            .map_err(AppError::Internal)?;
        grouped.push((container, records));
    }
    Ok(grouped)
}

fn summarize(container: Container, records: &[InventoryRecord], value: f64) -> ContainerSummary {
    let actual_count = records.len() as u32;
    let in_sync = container
        .reported_count
        .map(|reported| reported == actual_count)
        .unwrap_or(true);
    ContainerSummary {
        container,
        actual_count,
        value,
        in_sync,
    }
}
