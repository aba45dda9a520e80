//! crates/cookbook_core/src/cart.rs
//!
//! Consolidates a user's shopping cart into a single ingredient list.
//!
//! Every ingredient line of every recipe in the cart is folded into one
//! accumulator keyed by (ingredient name, measurement unit). Matching is an
//! exact, case-sensitive string comparison on both components: "salt"/"g"
//! and "salt"/"tsp" stay separate entries, and no unit conversion ever
//! happens. The accumulator lives for exactly one invocation.

use std::collections::HashMap;

use uuid::Uuid;

use crate::ports::{CartSource, PortResult};

/// The grouping key deciding whether two ingredient lines merge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AggregationKey {
    pub name: String,
    pub measurement_unit: String,
}

/// One consolidated row of the shopping list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListEntry {
    pub name: String,
    pub measurement_unit: String,
    pub total_amount: i64,
}

/// Builds the consolidated shopping list for one user.
///
/// Fetches the cart once, then each recipe's full line list once, and folds
/// the lines in a single pass. Entries come out in first-seen order, tracked
/// explicitly alongside the totals so the output does not depend on any map
/// iteration guarantee. A missing recipe surfaces as `NotFound` for the whole
/// call; a partially summed list is never returned.
pub async fn build_shopping_list(
    source: &dyn CartSource,
    user_id: Uuid,
) -> PortResult<Vec<ShoppingListEntry>> {
    let recipe_ids = source.cart_recipe_ids(user_id).await?;

    let mut positions: HashMap<AggregationKey, usize> = HashMap::new();
    let mut entries: Vec<ShoppingListEntry> = Vec::new();

    for recipe_id in recipe_ids {
        let lines = source.ingredient_lines(recipe_id).await?;
        for line in lines {
            let key = AggregationKey {
                name: line.name.clone(),
                measurement_unit: line.measurement_unit.clone(),
            };
            match positions.get(&key) {
                Some(&pos) => entries[pos].total_amount += i64::from(line.amount),
                None => {
                    positions.insert(key, entries.len());
                    entries.push(ShoppingListEntry {
                        name: line.name,
                        measurement_unit: line.measurement_unit,
                        total_amount: i64::from(line.amount),
                    });
                }
            }
        }
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IngredientLine;
    use crate::ports::{CartSource, PortError};
    use async_trait::async_trait;

    /// In-memory stand-in for the persistence layer.
    struct FakeCart {
        cart: Vec<Uuid>,
        recipes: Vec<(Uuid, Vec<IngredientLine>)>,
    }

    #[async_trait]
    impl CartSource for FakeCart {
        async fn cart_recipe_ids(&self, _user_id: Uuid) -> PortResult<Vec<Uuid>> {
            Ok(self.cart.clone())
        }

        async fn ingredient_lines(&self, recipe_id: Uuid) -> PortResult<Vec<IngredientLine>> {
            self.recipes
                .iter()
                .find(|(id, _)| *id == recipe_id)
                .map(|(_, lines)| lines.clone())
                .ok_or_else(|| PortError::NotFound(format!("Recipe {} not found", recipe_id)))
        }
    }

    fn line(name: &str, unit: &str, amount: i32) -> IngredientLine {
        IngredientLine {
            ingredient_id: Uuid::new_v4(),
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            amount,
        }
    }

    fn entry(name: &str, unit: &str, total: i64) -> ShoppingListEntry {
        ShoppingListEntry {
            name: name.to_string(),
            measurement_unit: unit.to_string(),
            total_amount: total,
        }
    }

    #[tokio::test]
    async fn empty_cart_yields_empty_list() {
        let source = FakeCart {
            cart: vec![],
            recipes: vec![],
        };
        let list = build_shopping_list(&source, Uuid::new_v4()).await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn single_recipe_single_line() {
        let recipe = Uuid::new_v4();
        let source = FakeCart {
            cart: vec![recipe],
            recipes: vec![(recipe, vec![line("Sugar", "g", 200)])],
        };
        let list = build_shopping_list(&source, Uuid::new_v4()).await.unwrap();
        assert_eq!(list, vec![entry("Sugar", "g", 200)]);
    }

    #[tokio::test]
    async fn merges_same_ingredient_across_recipes() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let source = FakeCart {
            cart: vec![a, b],
            recipes: vec![
                (a, vec![line("Flour", "g", 300)]),
                (b, vec![line("Flour", "g", 150), line("Salt", "tsp", 2)]),
            ],
        };
        let list = build_shopping_list(&source, Uuid::new_v4()).await.unwrap();
        assert_eq!(list, vec![entry("Flour", "g", 450), entry("Salt", "tsp", 2)]);
    }

    #[tokio::test]
    async fn same_name_different_unit_stays_separate() {
        let recipe = Uuid::new_v4();
        let source = FakeCart {
            cart: vec![recipe],
            recipes: vec![(recipe, vec![line("Salt", "g", 10), line("Salt", "tsp", 1)])],
        };
        let list = build_shopping_list(&source, Uuid::new_v4()).await.unwrap();
        assert_eq!(list, vec![entry("Salt", "g", 10), entry("Salt", "tsp", 1)]);
    }

    #[tokio::test]
    async fn distinct_ingredient_rows_with_equal_text_merge() {
        // Two ingredient rows sharing name and unit are one purchase.
        let recipe = Uuid::new_v4();
        let source = FakeCart {
            cart: vec![recipe],
            recipes: vec![(recipe, vec![line("Butter", "g", 50), line("Butter", "g", 25)])],
        };
        let list = build_shopping_list(&source, Uuid::new_v4()).await.unwrap();
        assert_eq!(list, vec![entry("Butter", "g", 75)]);
    }

    #[tokio::test]
    async fn recipe_without_lines_contributes_nothing() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let source = FakeCart {
            cart: vec![a, b],
            recipes: vec![(a, vec![]), (b, vec![line("Eggs", "pcs", 4)])],
        };
        let list = build_shopping_list(&source, Uuid::new_v4()).await.unwrap();
        assert_eq!(list, vec![entry("Eggs", "pcs", 4)]);
    }

    #[tokio::test]
    async fn output_order_is_first_seen_and_stable() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let source = FakeCart {
            cart: vec![a, b],
            recipes: vec![
                (
                    a,
                    vec![line("Milk", "ml", 500), line("Flour", "g", 200)],
                ),
                (
                    b,
                    vec![line("Flour", "g", 100), line("Milk", "ml", 250)],
                ),
            ],
        };
        let user = Uuid::new_v4();
        let first = build_shopping_list(&source, user).await.unwrap();
        let second = build_shopping_list(&source, user).await.unwrap();

        assert_eq!(
            first,
            vec![entry("Milk", "ml", 750), entry("Flour", "g", 300)]
        );
        // No hidden accumulation between calls.
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn missing_recipe_fails_the_whole_request() {
        let (present, missing) = (Uuid::new_v4(), Uuid::new_v4());
        let source = FakeCart {
            cart: vec![present, missing],
            recipes: vec![(present, vec![line("Rice", "g", 100)])],
        };
        let result = build_shopping_list(&source, Uuid::new_v4()).await;
        assert!(matches!(result, Err(PortError::NotFound(_))));
    }
}
