// Domain records returned by the Grocy REST API.

mod battery;
mod chore;
mod due;
mod equipment;
mod generic;
pub mod lenient;
mod meal_plan;
mod shopping_list;
mod stock;
mod system;
mod task;

pub use battery::{Battery, BatteryDetails};
pub use chore::Chore;
pub use due::Due;
pub use equipment::Equipment;
pub use generic::{EntityCapabilities, GenericEntityType, TransactionType};
pub use meal_plan::{MealPlanEntry, Recipe};
pub use shopping_list::ShoppingListItem;
pub use stock::{MissingProduct, ProductDetails, StockEntry, VolatileStock};
pub use system::{GrocyVersion, SystemConfig, SystemInfo};
pub use task::Task;
