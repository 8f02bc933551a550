//! Fetch one entity key straight from Grocy, bypassing the coordinator's
//! cache.

use chrono::Local;
use tabled::Tabled;

use grocy_core::fetch::{FetchContext, fetch};
use grocy_core::{AttributeValue, Attributes, Coordinator, CoordinatorConfig, EntityKey};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Fields that carry a record's due moment, by record family.
const DUE_FIELDS: [&str; 5] = [
    "due_date",
    "next_estimated_execution_time",
    "next_estimated_charge_time",
    "best_before_date",
    "day",
];

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Due")]
    due: String,
}

fn field(attrs: &Attributes, name: &str) -> String {
    attrs.get(name).map(output::display_value).unwrap_or_default()
}

fn record_name(attrs: &Attributes) -> String {
    if let Some(name) = attrs.get("name") {
        return output::display_value(name);
    }
    // Meal plan entries are named by their recipe.
    match attrs.get("recipe") {
        Some(AttributeValue::Map(recipe)) => field(recipe, "name"),
        _ => String::new(),
    }
}

fn to_row(record: &AttributeValue) -> RecordRow {
    let AttributeValue::Map(attrs) = record else {
        return RecordRow {
            id: String::new(),
            name: output::display_value(record),
            due: String::new(),
        };
    };
    RecordRow {
        id: field(attrs, "id"),
        name: record_name(attrs),
        due: DUE_FIELDS
            .iter()
            .map(|f| field(attrs, f))
            .find(|v| !v.is_empty())
            .unwrap_or_default(),
    }
}

fn record_id(record: &AttributeValue) -> String {
    match record {
        AttributeValue::Map(attrs) => field(attrs, "id"),
        other => output::display_value(other),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    config: CoordinatorConfig,
    key: EntityKey,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let ctx = FetchContext::new(Local::now().naive_local(), config.due_soon_days);
    let coordinator = Coordinator::new(config)?;
    let data = fetch(coordinator.client(), key, ctx).await?;

    let records = data.to_attribute_list();
    let out = output::render_list(&global.output, &records, to_row, record_id);
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use grocy_core::attributes::AttributeValue as V;

    use super::*;

    #[test]
    fn meal_plan_rows_use_recipe_name() {
        let mut recipe = Attributes::new();
        recipe.insert("name".into(), V::Text("Pancakes".into()));
        let mut entry = Attributes::new();
        entry.insert("id".into(), V::Int(4));
        entry.insert("day".into(), V::Text("2024-05-01".into()));
        entry.insert("recipe".into(), V::Map(recipe));

        let row = to_row(&V::Map(entry));
        assert_eq!(row.id, "4");
        assert_eq!(row.name, "Pancakes");
        assert_eq!(row.due, "2024-05-01");
    }

    #[test]
    fn missing_due_is_blank() {
        let mut attrs = Attributes::new();
        attrs.insert("id".into(), V::Int(1));
        attrs.insert("name".into(), V::Text("Drill".into()));
        attrs.insert("due_date".into(), V::Null);
        let row = to_row(&V::Map(attrs));
        assert_eq!(row.due, "");
        assert_eq!(record_id(&V::Map(Attributes::new())), "");
    }
}
