//! Flat join rows to pizza object graph.
//!
//! # Responsibility
//! - Decode one left-outer-join fan-out row with explicit null handling.
//! - Fold an ordered row batch into deduplicated pizzas.
//!
//! # Invariants
//! - One pizza per id per hydration, ordered by first appearance.
//! - Scalar fields are taken from the first row seen for a pizza.
//! - Each ingredient id appears at most once per pizza, whatever the fan-out.
//! - Hydration is in-memory only; no state survives a `finish()`.

use crate::model::menu::{Category, Ingredient, IngredientId, Pizza, PizzaId};
use crate::repo::error::{RepoError, RepoResult};
use rusqlite::Row;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// Fan-out query over pizzas with their optional category and ingredients.
///
/// Callers append `WHERE`/`ORDER BY` clauses. Rows for one pizza are not
/// required to be contiguous.
pub(crate) const PIZZA_JOIN_SELECT_SQL: &str = "SELECT
    p.id AS pizza_id,
    p.name AS pizza_name,
    p.description AS pizza_description,
    p.price AS pizza_price,
    c.id AS category_id,
    c.name AS category_name,
    i.id AS ingredient_id,
    i.name AS ingredient_name
FROM pizzas p
LEFT JOIN categories c ON c.id = p.category_id
LEFT JOIN pizza_ingredients pi ON pi.pizza_id = p.id
LEFT JOIN ingredients i ON i.id = pi.ingredient_id";

/// One flat row of the pizza fan-out query.
#[derive(Debug, Clone, PartialEq)]
pub struct PizzaJoinRow {
    pub pizza_id: PizzaId,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// `None` when every category column is null.
    pub category: Option<Category>,
    /// `None` when every ingredient column is null.
    pub ingredient: Option<Ingredient>,
}

impl PizzaJoinRow {
    /// Decodes a row produced by `PIZZA_JOIN_SELECT_SQL`.
    pub(crate) fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let category = joined_pair(
            row.get("category_id")?,
            row.get("category_name")?,
            "categories",
        )?
        .map(|(id, name)| Category { id, name });
        let ingredient = joined_pair(
            row.get("ingredient_id")?,
            row.get("ingredient_name")?,
            "ingredients",
        )?
        .map(|(id, name)| Ingredient { id, name });

        Ok(Self {
            pizza_id: row.get("pizza_id")?,
            name: row.get("pizza_name")?,
            description: row.get("pizza_description")?,
            price: row.get("pizza_price")?,
            category,
            ingredient,
        })
    }
}

fn joined_pair(
    id: Option<i64>,
    name: Option<String>,
    table: &str,
) -> RepoResult<Option<(i64, String)>> {
    match (id, name) {
        (Some(id), Some(name)) => Ok(Some((id, name))),
        (None, None) => Ok(None),
        (Some(id), None) => Err(RepoError::InvalidData(format!(
            "joined {table} row {id} has null name"
        ))),
        (None, Some(_)) => Err(RepoError::InvalidData(format!(
            "joined {table} row has name but null id"
        ))),
    }
}

struct PizzaBuilder {
    pizza: Pizza,
    seen_ingredients: HashSet<IngredientId>,
}

/// Accumulates fan-out rows into pizzas.
#[derive(Default)]
pub struct PizzaHydrator {
    order: Vec<PizzaId>,
    building: HashMap<PizzaId, PizzaBuilder>,
}

impl PizzaHydrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one row into the pizza it belongs to.
    pub fn push(&mut self, row: PizzaJoinRow) {
        let PizzaJoinRow {
            pizza_id,
            name,
            description,
            price,
            category,
            ingredient,
        } = row;

        let builder = match self.building.entry(pizza_id) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                self.order.push(pizza_id);
                entry.insert(PizzaBuilder {
                    pizza: Pizza::new(pizza_id, name, description, price),
                    seen_ingredients: HashSet::new(),
                })
            }
        };

        // Same category on every row of a pizza; overwriting is a no-op.
        if let Some(category) = category {
            builder.pizza.category_id = Some(category.id);
            builder.pizza.category = Some(category);
        }

        if let Some(ingredient) = ingredient {
            if builder.seen_ingredients.insert(ingredient.id) {
                builder.pizza.ingredient_ids.push(ingredient.id);
                builder.pizza.ingredients.push(ingredient);
            }
        }
    }

    /// Number of distinct pizzas seen so far.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Returns pizzas in first-appearance order.
    pub fn finish(self) -> Vec<Pizza> {
        let Self {
            order,
            mut building,
        } = self;
        order
            .into_iter()
            .filter_map(|pizza_id| building.remove(&pizza_id))
            .map(|builder| builder.pizza)
            .collect()
    }
}

/// Hydrates an ordered row batch in one call.
pub fn hydrate_pizzas<I>(rows: I) -> Vec<Pizza>
where
    I: IntoIterator<Item = PizzaJoinRow>,
{
    let mut hydrator = PizzaHydrator::new();
    for row in rows {
        hydrator.push(row);
    }
    hydrator.finish()
}

#[cfg(test)]
mod tests {
    use super::{hydrate_pizzas, PizzaHydrator, PizzaJoinRow};
    use crate::model::menu::{Category, Ingredient};
    use crate::repo::error::{RepoError, RepoResult};
    use proptest::prelude::*;
    use rusqlite::Connection;
    use std::collections::{BTreeMap, BTreeSet, HashSet};

    fn row(
        pizza_id: i64,
        name: &str,
        price: f64,
        category: Option<(i64, &str)>,
        ingredient: Option<(i64, &str)>,
    ) -> PizzaJoinRow {
        PizzaJoinRow {
            pizza_id,
            name: name.to_string(),
            description: String::new(),
            price,
            category: category.map(|(id, name)| Category {
                id,
                name: name.to_string(),
            }),
            ingredient: ingredient.map(|(id, name)| Ingredient {
                id,
                name: name.to_string(),
            }),
        }
    }

    #[test]
    fn empty_batch_hydrates_to_nothing() {
        assert!(hydrate_pizzas(Vec::new()).is_empty());
        assert!(PizzaHydrator::new().is_empty());
    }

    #[test]
    fn margherita_and_diavola_scenario() {
        let pizzas = hydrate_pizzas(vec![
            row(1, "Margherita", 7.5, None, Some((1, "Mozzarella"))),
            row(1, "Margherita", 7.5, None, Some((2, "Tomato"))),
            row(2, "Diavola", 8.0, Some((3, "Spicy")), None),
        ]);

        assert_eq!(pizzas.len(), 2);
        let margherita = &pizzas[0];
        assert_eq!(margherita.id, 1);
        assert_eq!(margherita.category, None);
        assert_eq!(margherita.category_id, None);
        assert_eq!(margherita.ingredient_names(), vec!["Mozzarella", "Tomato"]);
        assert_eq!(margherita.ingredient_ids, vec![1, 2]);

        let diavola = &pizzas[1];
        assert_eq!(diavola.id, 2);
        assert_eq!(diavola.category_id, Some(3));
        assert_eq!(
            diavola.category.as_ref().map(|category| category.name.as_str()),
            Some("Spicy")
        );
        assert!(diavola.ingredients.is_empty());
    }

    #[test]
    fn repeated_ingredient_rows_are_collapsed() {
        let pizzas = hydrate_pizzas(vec![
            row(7, "Capricciosa", 9.0, Some((1, "Classic")), Some((4, "Ham"))),
            row(7, "Capricciosa", 9.0, Some((1, "Classic")), Some((5, "Olives"))),
            row(7, "Capricciosa", 9.0, Some((1, "Classic")), Some((4, "Ham"))),
            row(7, "Capricciosa", 9.0, Some((1, "Classic")), Some((5, "Olives"))),
        ]);

        assert_eq!(pizzas.len(), 1);
        assert_eq!(pizzas[0].ingredient_ids, vec![4, 5]);
        assert_eq!(pizzas[0].category_id, Some(1));
    }

    #[test]
    fn interleaved_rows_accumulate_by_key_and_keep_first_appearance_order() {
        let pizzas = hydrate_pizzas(vec![
            row(3, "Bianca", 6.0, None, Some((1, "Mozzarella"))),
            row(1, "Margherita", 7.5, None, Some((2, "Tomato"))),
            row(3, "Bianca", 6.0, None, Some((6, "Rosemary"))),
            row(2, "Diavola", 8.0, None, None),
            row(1, "Margherita", 7.5, None, Some((1, "Mozzarella"))),
        ]);

        let ids: Vec<i64> = pizzas.iter().map(|pizza| pizza.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(pizzas[0].ingredient_ids, vec![1, 6]);
        assert_eq!(pizzas[1].ingredient_ids, vec![2, 1]);
        assert!(pizzas[2].ingredient_ids.is_empty());
    }

    #[test]
    fn scalar_fields_are_fixed_at_first_sight() {
        let mut hydrator = PizzaHydrator::new();
        hydrator.push(row(1, "Margherita", 7.5, None, None));
        hydrator.push(row(1, "Renamed", 99.0, None, Some((2, "Tomato"))));
        assert_eq!(hydrator.len(), 1);

        let pizzas = hydrator.finish();
        assert_eq!(pizzas[0].name, "Margherita");
        assert_eq!(pizzas[0].price, 7.5);
        assert_eq!(pizzas[0].ingredient_ids, vec![2]);
    }

    fn decode(select: &str) -> RepoResult<PizzaJoinRow> {
        let conn = Connection::open_in_memory().unwrap();
        conn.query_row(select, [], |row| Ok(PizzaJoinRow::from_row(row)))
            .unwrap()
    }

    #[test]
    fn from_row_decodes_null_reference_columns_as_absent() {
        let decoded = decode(
            "SELECT 1 AS pizza_id, 'Marinara' AS pizza_name, '' AS pizza_description,
                    6.0 AS pizza_price, NULL AS category_id, NULL AS category_name,
                    2 AS ingredient_id, 'Tomato' AS ingredient_name;",
        )
        .unwrap();

        assert_eq!(decoded.category, None);
        assert_eq!(
            decoded.ingredient,
            Some(Ingredient {
                id: 2,
                name: "Tomato".to_string(),
            })
        );
    }

    #[test]
    fn from_row_rejects_category_id_without_name() {
        let err = decode(
            "SELECT 1 AS pizza_id, 'Diavola' AS pizza_name, '' AS pizza_description,
                    8.0 AS pizza_price, 3 AS category_id, NULL AS category_name,
                    NULL AS ingredient_id, NULL AS ingredient_name;",
        )
        .unwrap_err();

        match err {
            RepoError::InvalidData(message) => assert!(message.contains("categories row 3")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn from_row_rejects_ingredient_name_without_id() {
        let err = decode(
            "SELECT 1 AS pizza_id, 'Diavola' AS pizza_name, '' AS pizza_description,
                    8.0 AS pizza_price, NULL AS category_id, NULL AS category_name,
                    NULL AS ingredient_id, 'Salame' AS ingredient_name;",
        )
        .unwrap_err();

        assert!(matches!(err, RepoError::InvalidData(_)));
    }

    type Menu = BTreeMap<i64, BTreeSet<i64>>;

    /// Expands a menu into fan-out rows, each repeated `copies` times.
    fn fan_out_rows(menu: &Menu, copies: usize) -> Vec<PizzaJoinRow> {
        let mut rows = Vec::new();
        for (&pizza_id, ingredient_ids) in menu {
            for _ in 0..copies {
                if ingredient_ids.is_empty() {
                    rows.push(row(pizza_id, "Pizza", 5.0, None, None));
                }
                for &ingredient_id in ingredient_ids {
                    rows.push(row(pizza_id, "Pizza", 5.0, None, Some((ingredient_id, "Topping"))));
                }
            }
        }
        rows
    }

    fn shuffled_batch() -> impl Strategy<Value = (Menu, Vec<PizzaJoinRow>)> {
        (
            prop::collection::btree_map(
                1i64..500,
                prop::collection::btree_set(1i64..40, 0..6),
                0..10,
            ),
            1usize..4,
        )
            .prop_flat_map(|(menu, copies)| {
                let rows = fan_out_rows(&menu, copies);
                (Just(menu), Just(rows).prop_shuffle())
            })
    }

    proptest! {
        #[test]
        fn any_batch_yields_one_pizza_per_id_with_distinct_ingredients(
            (menu, rows) in shuffled_batch()
        ) {
            let mut first_seen = Vec::new();
            let mut seen = HashSet::new();
            for row in &rows {
                if seen.insert(row.pizza_id) {
                    first_seen.push(row.pizza_id);
                }
            }

            let pizzas = hydrate_pizzas(rows);

            prop_assert_eq!(pizzas.len(), menu.len());
            let ids: Vec<i64> = pizzas.iter().map(|pizza| pizza.id).collect();
            prop_assert_eq!(ids, first_seen);
            for pizza in &pizzas {
                let expected = &menu[&pizza.id];
                prop_assert_eq!(pizza.ingredient_ids.len(), expected.len());
                let actual: BTreeSet<i64> = pizza.ingredient_ids.iter().copied().collect();
                prop_assert_eq!(&actual, expected);
                prop_assert_eq!(pizza.ingredients.len(), expected.len());
            }
        }
    }
}
