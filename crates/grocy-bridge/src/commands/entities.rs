//! Entity states from a one-shot coordinator run.

use tabled::Tabled;

use grocy_core::{Coordinator, CoordinatorConfig, EntityKey, EntityState};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "Entity")]
    entity_id: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Available")]
    available: String,
    #[tabled(rename = "Stale")]
    stale: String,
}

fn to_row(entity: &EntityState, color: bool) -> EntityRow {
    let state = output::display_value(&entity.state);
    EntityRow {
        entity_id: entity.entity_id.clone(),
        state: output::highlight(&state, state == "on", color),
        unit: entity.unit.clone().unwrap_or_default(),
        available: if entity.available { "yes" } else { "no" }.into(),
        stale: if entity.stale {
            output::highlight("yes", true, color)
        } else {
            String::new()
        },
    }
}

pub async fn handle(
    config: CoordinatorConfig,
    key: Option<EntityKey>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let states = Coordinator::oneshot(config, |c| async move {
        match key {
            Some(key) => c.entity_state(key).map(|s| vec![s]),
            None => Ok(c.entity_states()),
        }
    })
    .await?;

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &states,
        |s| to_row(s, color),
        |s| s.entity_id.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
