use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Entity types reachable through Grocy's generic `/objects/{entity}` API.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum GenericEntityType {
    Products,
    Chores,
    ProductBarcodes,
    Batteries,
    Locations,
    QuantityUnits,
    QuantityUnitConversions,
    ShoppingList,
    ShoppingLists,
    ShoppingLocations,
    Recipes,
    RecipesPos,
    RecipesNestings,
    Tasks,
    TaskCategories,
    ProductGroups,
    Equipment,
    Userfields,
    Userentities,
    Userobjects,
    MealPlan,
    MealPlanSections,
    // Read-only views
    Stock,
    StockLog,
    ChoresLog,
    BatteriesLog,
    StockCurrentLocations,
    QuantityUnitConversionsResolved,
    RecipesPosResolved,
}

/// What the generic API lets a caller do with an entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityCapabilities {
    pub list: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

impl EntityCapabilities {
    const EDITABLE: Self = Self {
        list: true,
        create: true,
        update: true,
        delete: true,
    };
    const READ_ONLY: Self = Self {
        list: true,
        create: false,
        update: false,
        delete: false,
    };
}

impl GenericEntityType {
    pub fn capabilities(self) -> EntityCapabilities {
        match self {
            Self::Stock
            | Self::StockLog
            | Self::ChoresLog
            | Self::BatteriesLog
            | Self::StockCurrentLocations
            | Self::QuantityUnitConversionsResolved
            | Self::RecipesPosResolved => EntityCapabilities::READ_ONLY,
            _ => EntityCapabilities::EDITABLE,
        }
    }
}

/// Stock transaction kind for consume calls.
///
/// Parses both Grocy's wire names (`consume`) and the upper-case names
/// used in automation payloads (`CONSUME`, `INVENTORY_CORRECTION`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(ascii_case_insensitive)]
pub enum TransactionType {
    #[strum(to_string = "purchase")]
    Purchase,
    #[default]
    #[strum(to_string = "consume")]
    Consume,
    #[strum(to_string = "inventory-correction", serialize = "inventory_correction")]
    InventoryCorrection,
    #[strum(to_string = "product-opened", serialize = "product_opened")]
    ProductOpened,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn entity_type_round_trips_snake_case() {
        assert_eq!(GenericEntityType::MealPlan.to_string(), "meal_plan");
        assert_eq!(
            "shopping_list".parse::<GenericEntityType>().unwrap(),
            GenericEntityType::ShoppingList
        );
        assert!("nonsense".parse::<GenericEntityType>().is_err());
    }

    #[test]
    fn views_are_read_only() {
        let caps = GenericEntityType::StockLog.capabilities();
        assert!(caps.list);
        assert!(!caps.create && !caps.update && !caps.delete);
        assert!(GenericEntityType::Tasks.capabilities().delete);
    }

    #[test]
    fn transaction_type_accepts_both_spellings() {
        assert_eq!("CONSUME".parse::<TransactionType>().unwrap(), TransactionType::Consume);
        assert_eq!(
            "INVENTORY_CORRECTION".parse::<TransactionType>().unwrap(),
            TransactionType::InventoryCorrection
        );
        assert_eq!(
            "product-opened".parse::<TransactionType>().unwrap(),
            TransactionType::ProductOpened
        );
        assert_eq!(TransactionType::InventoryCorrection.to_string(), "inventory-correction");
        assert_eq!(
            serde_json::to_string(&TransactionType::ProductOpened).unwrap(),
            "\"product-opened\""
        );
    }
}
