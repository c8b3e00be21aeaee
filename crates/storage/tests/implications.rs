#![forbid(unsafe_code)]

mod common;

use common::{TestStore, pair, tagged_file};
use pretty_assertions::assert_eq;
use tv_core::entities::Implication;
use tv_storage::StoreError;

fn render(implications: &[Implication]) -> Vec<String> {
    implications
        .iter()
        .map(|implication| {
            let side = |tag: &str, value: &str| {
                if value.is_empty() {
                    tag.to_string()
                } else {
                    format!("{tag}={value}")
                }
            };
            format!(
                "{} -> {}",
                side(&implication.implying_tag.name, implication.implying_value_name()),
                side(&implication.implied_tag.name, implication.implied_value_name())
            )
        })
        .collect()
}

#[test]
fn adding_an_implication_twice_is_idempotent() {
    let mut ts = TestStore::open();
    let tx = ts.store.transaction().expect("begin");
    let dog = pair(&tx, "dog", None);
    let animal = pair(&tx, "animal", None);

    tx.add_implication(dog, animal).expect("add");
    tx.add_implication(dog, animal).expect("add again");

    assert_eq!(render(&tx.implications().expect("list")), vec!["dog -> animal"]);
}

#[test]
fn list_is_ordered_by_names_and_values_are_resolved() {
    let mut ts = TestStore::open();
    let tx = ts.store.transaction().expect("begin");
    let dog = pair(&tx, "dog", None);
    let cat = pair(&tx, "cat", None);
    let animal = pair(&tx, "animal", None);
    let rating_5 = pair(&tx, "rating", Some("5"));
    let good = pair(&tx, "good", None);
    let mammal = pair(&tx, "mammal", None);

    tx.add_implication(dog, mammal).expect("add");
    tx.add_implication(dog, animal).expect("add");
    tx.add_implication(rating_5, good).expect("add");
    tx.add_implication(cat, animal).expect("add");

    assert_eq!(
        render(&tx.implications().expect("list")),
        vec![
            "cat -> animal",
            "dog -> animal",
            "dog -> mammal",
            "rating=5 -> good",
        ]
    );
}

#[test]
fn implications_for_matches_any_implying_pair_exactly() {
    let mut ts = TestStore::open();
    let tx = ts.store.transaction().expect("begin");
    let dog = pair(&tx, "dog", None);
    let cat = pair(&tx, "cat", None);
    let puppy = pair(&tx, "puppy", None);
    let animal = pair(&tx, "animal", None);
    let rating_5 = pair(&tx, "rating", Some("5"));
    let rating = pair(&tx, "rating", None);
    let favourite = pair(&tx, "favourite", None);

    tx.add_implication(dog, animal).expect("add");
    tx.add_implication(cat, animal).expect("add");
    tx.add_implication(puppy, dog).expect("add");
    tx.add_implication(rating_5, favourite).expect("add");

    assert_eq!(
        render(&tx.implications_for(&[dog, puppy]).expect("for")),
        vec!["dog -> animal", "puppy -> dog"]
    );
    assert_eq!(
        render(&tx.implications_for(&[rating_5]).expect("for")),
        vec!["rating=5 -> favourite"]
    );
    // The bare tag does not match an implication keyed on one of its values.
    assert!(tx.implications_for(&[rating]).expect("for").is_empty());
    assert!(tx.implications_for(&[]).expect("for").is_empty());
}

#[test]
fn deleting_a_missing_implication_fails_and_changes_nothing() {
    let mut ts = TestStore::open();
    let tx = ts.store.transaction().expect("begin");
    let dog = pair(&tx, "dog", None);
    let cat = pair(&tx, "cat", None);
    let animal = pair(&tx, "animal", None);
    tx.add_implication(dog, animal).expect("add");

    let err = tx.delete_implication(cat, animal).expect_err("missing");
    match err {
        StoreError::NoSuchImplication { implying, implied } => {
            assert_eq!(implying, cat);
            assert_eq!(implied, animal);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(
        !tx.delete_implication(cat, animal)
            .expect_err("still missing")
            .is_defect()
    );
    assert_eq!(render(&tx.implications().expect("list")), vec!["dog -> animal"]);

    tx.delete_implication(dog, animal).expect("delete");
    assert!(tx.implications().expect("list").is_empty());
}

#[test]
fn delete_distinguishes_valued_and_bare_sides() {
    let mut ts = TestStore::open();
    let tx = ts.store.transaction().expect("begin");
    let rating = pair(&tx, "rating", None);
    let rating_5 = pair(&tx, "rating", Some("5"));
    let good = pair(&tx, "good", None);
    tx.add_implication(rating_5, good).expect("add");

    assert!(matches!(
        tx.delete_implication(rating, good),
        Err(StoreError::NoSuchImplication { .. })
    ));
    tx.delete_implication(rating_5, good).expect("delete valued");
}

#[test]
fn deleting_a_tag_or_value_cascades_to_implications() {
    let mut ts = TestStore::open();
    let tx = ts.store.transaction().expect("begin");
    let dog = pair(&tx, "dog", None);
    let animal = pair(&tx, "animal", None);
    let puppy = pair(&tx, "puppy", None);
    let rating_5 = pair(&tx, "rating", Some("5"));
    let favourite = pair(&tx, "favourite", Some("yes"));

    tx.add_implication(puppy, dog).expect("add");
    tx.add_implication(dog, animal).expect("add");
    tx.add_implication(rating_5, favourite).expect("add");
    tx.add_implication(puppy, favourite).expect("add");

    tx.delete_tag(dog.tag_id).expect("delete dog");
    assert_eq!(
        render(&tx.implications().expect("list")),
        vec!["puppy -> favourite=yes", "rating=5 -> favourite=yes"]
    );

    let yes = favourite.value_id.expect("valued");
    tx.delete_value(yes).expect("delete yes");
    assert!(tx.implications().expect("list").is_empty());
}

#[test]
fn bulk_delete_counts_removed_implications() {
    let mut ts = TestStore::open();
    let tx = ts.store.transaction().expect("begin");
    let a = pair(&tx, "a", None);
    let b = pair(&tx, "b", None);
    let c = pair(&tx, "c", None);
    tx.add_implication(a, b).expect("add");
    tx.add_implication(b, c).expect("add");
    tx.add_implication(c, a).expect("add");

    assert_eq!(tx.delete_implications_for_tag(b.tag_id).expect("bulk"), 2);
    assert_eq!(render(&tx.implications().expect("list")), vec!["c -> a"]);
}

#[test]
fn implications_survive_commit() {
    let mut ts = TestStore::open();
    {
        let tx = ts.store.transaction().expect("begin");
        let dog = pair(&tx, "dog", None);
        let animal = pair(&tx, "animal", None);
        tx.add_implication(dog, animal).expect("add");
        tagged_file(&tx, "rex.jpg", 1, &["dog"]);
        tx.commit().expect("commit");
    }

    let tx = ts.store.transaction().expect("begin");
    assert_eq!(render(&tx.implications().expect("list")), vec!["dog -> animal"]);
}

#[test]
fn bulk_delete_for_value_clears_both_sides_only() {
    let mut ts = TestStore::open();
    let tx = ts.store.transaction().expect("begin");
    let rating_5 = pair(&tx, "rating", Some("5"));
    let rating_4 = pair(&tx, "rating", Some("4"));
    let stars_5 = pair(&tx, "stars", Some("5"));
    let good = pair(&tx, "good", None);
    let starred = pair(&tx, "starred", None);

    tx.add_implication(rating_5, good).expect("add");
    tx.add_implication(starred, stars_5).expect("add");
    tx.add_implication(rating_4, good).expect("add");

    let five = rating_5.value_id.expect("valued");
    assert_eq!(tx.delete_implications_for_value(five).expect("bulk"), 2);
    assert_eq!(render(&tx.implications().expect("list")), vec!["rating=4 -> good"]);
    // The value itself is untouched; only its implications go.
    assert!(tx.value(five).expect("value").is_some());
}
