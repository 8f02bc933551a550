// ── Command routing ──
//
// Each command maps to exactly one mutating Grocy call. Once it succeeds
// the affected keys are refreshed before the caller gets its reply.

use tracing::{debug, info, warn};

use super::Coordinator;
use crate::command::{Command, CommandResult};
use crate::error::CoreError;

pub(super) async fn route_command(
    coordinator: &Coordinator,
    cmd: Command,
) -> Result<CommandResult, CoreError> {
    let result = {
        let _permit = coordinator.inner.access.permit().await?;
        send(coordinator, &cmd).await?
    };
    info!(command = cmd.name(), "command executed");

    let keys = cmd.affected_keys();
    if !keys.is_empty() {
        let report = coordinator.refresh_keys(keys).await;
        if report.is_success() {
            debug!(refreshed = ?report.refreshed, "refreshed after {}", cmd.name());
        } else {
            warn!(
                command = cmd.name(),
                failed = ?report.failed,
                "refresh after command failed"
            );
        }
    }

    Ok(result)
}

async fn send(coordinator: &Coordinator, cmd: &Command) -> Result<CommandResult, CoreError> {
    let client = coordinator.client();

    match cmd {
        // ── Stock ────────────────────────────────────────────────

        Command::AddProduct {
            product_id,
            amount,
            price,
        } => {
            client.add_product(*product_id, *amount, *price).await?;
            Ok(CommandResult::Ok)
        }

        Command::OpenProduct {
            product_id,
            amount,
            allow_subproduct_substitution,
        } => {
            client
                .open_product(*product_id, *amount, *allow_subproduct_substitution)
                .await?;
            Ok(CommandResult::Ok)
        }

        Command::ConsumeProduct {
            product_id,
            amount,
            spoiled,
            transaction_type,
            allow_subproduct_substitution,
        } => {
            client
                .consume_product(
                    *product_id,
                    *amount,
                    *spoiled,
                    *transaction_type,
                    *allow_subproduct_substitution,
                )
                .await?;
            Ok(CommandResult::Ok)
        }

        // ── Chores, tasks, batteries ─────────────────────────────

        Command::ExecuteChore {
            chore_id,
            done_by,
            tracked_time,
            skipped,
        } => {
            client
                .execute_chore(*chore_id, *done_by, *tracked_time, *skipped)
                .await?;
            Ok(CommandResult::Ok)
        }

        Command::CompleteTask { task_id, done_time } => {
            client.complete_task(*task_id, *done_time).await?;
            Ok(CommandResult::Ok)
        }

        Command::TrackBattery {
            battery_id,
            tracked_time,
        } => {
            client.charge_battery(*battery_id, *tracked_time).await?;
            Ok(CommandResult::Ok)
        }

        // ── Generic objects ──────────────────────────────────────

        Command::AddGeneric { entity_type, data } => {
            let object_id = client.add_generic(*entity_type, data).await?;
            Ok(CommandResult::Created { object_id })
        }

        Command::UpdateGeneric {
            entity_type,
            object_id,
            data,
        } => {
            client.update_generic(*entity_type, *object_id, data).await?;
            Ok(CommandResult::Ok)
        }

        Command::DeleteGeneric {
            entity_type,
            object_id,
        } => {
            client.delete_generic(*entity_type, *object_id).await?;
            Ok(CommandResult::Ok)
        }

        // ── Recipes and shopping list ────────────────────────────

        Command::ConsumeRecipe { recipe_id } => {
            client.consume_recipe(*recipe_id).await?;
            Ok(CommandResult::Ok)
        }

        Command::AddMissingProductsToShoppingList { list_id } => {
            client.add_missing_products_to_shopping_list(*list_id).await?;
            Ok(CommandResult::Ok)
        }

        Command::RemoveProductInShoppingList {
            product_id,
            shopping_list_id,
            amount,
        } => {
            client
                .remove_product_from_shopping_list(*product_id, *shopping_list_id, *amount)
                .await?;
            Ok(CommandResult::Ok)
        }
    }
}
