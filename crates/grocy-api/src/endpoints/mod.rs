// Endpoint groups, each an `impl GrocyClient` block.

mod batteries;
mod chores;
mod files;
mod meal_plan;
mod objects;
mod shopping_list;
mod stock;
mod system;
mod tasks;

pub use files::FileResponse;

use chrono::NaiveDateTime;

use crate::models::lenient::grocy_datetime::FORMAT;

/// Render an optional timestamp the way Grocy's POST bodies expect it.
fn grocy_time(ts: Option<NaiveDateTime>) -> Option<String> {
    ts.map(|t| t.format(FORMAT).to_string())
}
