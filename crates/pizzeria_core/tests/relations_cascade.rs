use pizzeria_core::db::open_db_in_memory;
use pizzeria_core::repo::cascade::{CATEGORY_CASCADE, INGREDIENT_CASCADE, PIZZA_CASCADE};
use pizzeria_core::repo::relations::{
    clear_links, insert_links, linked_peer_ids, replace_links, PIZZA_INGREDIENTS,
};
use pizzeria_core::{CascadeOutcome, RepoError};
use proptest::prelude::*;
use rusqlite::Connection;
use std::collections::BTreeSet;

fn seed(conn: &Connection) {
    conn.execute_batch(
        "INSERT INTO categories (id, name) VALUES (1, 'Classiche');
         INSERT INTO ingredients (id, name) VALUES (1, 'Mozzarella'), (2, 'Tomato'), (3, 'Basil');
         INSERT INTO pizzas (id, name, price, category_id) VALUES (1, 'Margherita', 7.5, 1);
         INSERT INTO pizzas (id, name, price, category_id) VALUES (2, 'Marinara', 6.0, NULL);
         INSERT INTO pizza_ingredients (pizza_id, ingredient_id) VALUES (1, 1), (1, 2), (2, 2);",
    )
    .unwrap();
}

#[test]
fn parent_delete_without_cleanup_violates_foreign_key() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);

    let err = conn
        .execute("DELETE FROM pizzas WHERE id = 1;", [])
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"));

    let outcome = PIZZA_CASCADE.execute(&conn, 1).unwrap();
    assert_eq!(
        outcome,
        CascadeOutcome {
            dependents_affected: 2,
            parent_deleted: 1,
        }
    );
    assert_eq!(linked_peer_ids(&conn, &PIZZA_INGREDIENTS, 2).unwrap(), vec![2]);
}

#[test]
fn cascade_on_missing_parent_reports_zero_and_touches_nothing() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);

    let outcome = PIZZA_CASCADE.execute(&conn, 42).unwrap();
    assert!(!outcome.parent_existed());
    assert_eq!(outcome.dependents_affected, 0);

    let outcome = PIZZA_CASCADE.execute(&conn, 42).unwrap();
    assert_eq!(outcome, CascadeOutcome::default());
}

#[test]
fn ingredient_and_category_plans_clean_their_dependents() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);

    let outcome = INGREDIENT_CASCADE.execute(&conn, 2).unwrap();
    assert_eq!(outcome.dependents_affected, 2);
    assert_eq!(linked_peer_ids(&conn, &PIZZA_INGREDIENTS, 1).unwrap(), vec![1]);

    let outcome = CATEGORY_CASCADE.execute(&conn, 1).unwrap();
    assert_eq!(outcome.dependents_affected, 1);
    assert!(outcome.parent_existed());
    let category: Option<i64> = conn
        .query_row("SELECT category_id FROM pizzas WHERE id = 1;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(category, None);
}

#[test]
fn clear_is_idempotent_and_replace_is_full() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn);

    assert_eq!(clear_links(&conn, &PIZZA_INGREDIENTS, 1).unwrap(), 2);
    assert_eq!(clear_links(&conn, &PIZZA_INGREDIENTS, 1).unwrap(), 0);

    assert_eq!(
        replace_links(&conn, &PIZZA_INGREDIENTS, 1, &[3, 1, 3]).unwrap(),
        2
    );
    assert_eq!(
        linked_peer_ids(&conn, &PIZZA_INGREDIENTS, 1).unwrap(),
        vec![1, 3]
    );
    assert_eq!(insert_links(&conn, &PIZZA_INGREDIENTS, 1, &[]).unwrap(), 0);
}

#[test]
fn failed_replace_inside_transaction_rolls_back_the_clear() {
    let mut conn = open_db_in_memory().unwrap();
    seed(&conn);

    {
        let tx = conn.transaction().unwrap();
        let err = replace_links(&tx, &PIZZA_INGREDIENTS, 1, &[3, 99]).unwrap_err();
        assert!(matches!(err, RepoError::Db(ref db) if db.is_constraint_violation()));
    }

    assert_eq!(
        linked_peer_ids(&conn, &PIZZA_INGREDIENTS, 1).unwrap(),
        vec![1, 2]
    );
}

fn seed_topping_shelf(conn: &Connection) {
    conn.execute_batch(
        "INSERT INTO ingredients (id, name) VALUES
            (1, 'I1'), (2, 'I2'), (3, 'I3'), (4, 'I4'), (5, 'I5'), (6, 'I6'), (7, 'I7'), (8, 'I8');
         INSERT INTO pizzas (id, name, price) VALUES (1, 'Target', 5.0), (2, 'Bystander', 5.0);
         INSERT INTO pizza_ingredients (pizza_id, ingredient_id) VALUES (2, 1), (2, 8);",
    )
    .unwrap();
}

proptest! {
    #[test]
    fn replacing_with_any_set_leaves_exactly_that_set(
        before in prop::collection::vec(1i64..=8, 0..8),
        target in prop::collection::vec(1i64..=8, 0..12),
    ) {
        let conn = open_db_in_memory().unwrap();
        seed_topping_shelf(&conn);
        replace_links(&conn, &PIZZA_INGREDIENTS, 1, &before).unwrap();

        let expected: Vec<i64> = target
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let first = replace_links(&conn, &PIZZA_INGREDIENTS, 1, &target).unwrap();
        let second = replace_links(&conn, &PIZZA_INGREDIENTS, 1, &target).unwrap();

        prop_assert_eq!(first, expected.len());
        prop_assert_eq!(second, expected.len());
        prop_assert_eq!(linked_peer_ids(&conn, &PIZZA_INGREDIENTS, 1).unwrap(), expected);
        prop_assert_eq!(linked_peer_ids(&conn, &PIZZA_INGREDIENTS, 2).unwrap(), vec![1, 8]);
    }
}
