use super::*;
use crate::entities::{Tag, Value};
use crate::ids::{TagId, ValueId};
use crate::query::ComparisonOp;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::BTreeSet;

fn tag(id: i64, name: &str) -> Tag {
    Tag {
        id: TagId::new(id),
        name: name.to_string(),
    }
}

fn value(id: i64, name: &str) -> Value {
    Value {
        id: ValueId::new(id),
        name: name.to_string(),
    }
}

fn implies(implying: &Tag, implied: &Tag) -> Implication {
    Implication {
        implying_tag: implying.clone(),
        implying_value: None,
        implied_tag: implied.clone(),
        implied_value: None,
    }
}

fn or_chain(terms: Vec<Expression>) -> Expression {
    let mut terms = terms.into_iter();
    let first = terms.next().expect("at least one term");
    terms.fold(first, Expression::or)
}

#[test]
fn transitive_implications_are_ored_breadth_first() {
    let animal = tag(1, "animal");
    let dog = tag(2, "dog");
    let cat = tag(3, "cat");
    let puppy = tag(4, "puppy");
    let implications = vec![
        implies(&dog, &animal),
        implies(&cat, &animal),
        implies(&puppy, &dog),
    ];

    let expanded = expand_implications(Expression::tag("animal"), &implications);

    assert_eq!(
        expanded,
        or_chain(vec![
            Expression::tag("animal"),
            Expression::tag("dog"),
            Expression::tag("cat"),
            Expression::tag("puppy"),
        ])
    );
    assert_eq!(expanded.to_string(), "animal or dog or cat or puppy");
}

#[test]
fn leaf_without_implications_is_unchanged() {
    let animal = tag(1, "animal");
    let dog = tag(2, "dog");
    let implications = vec![implies(&dog, &animal)];

    assert_eq!(
        expand_implications(Expression::tag("dog"), &implications),
        Expression::tag("dog")
    );
    assert_eq!(
        expand_implications(Expression::tag("animal"), &[]),
        Expression::tag("animal")
    );
}

#[test]
fn cycles_terminate_and_expand_each_pair_once() {
    let a = tag(1, "a");
    let b = tag(2, "b");
    let c = tag(3, "c");
    let implications = vec![implies(&a, &b), implies(&b, &a), implies(&c, &b), implies(&b, &c)];
    let index = ImplicationIndex::new(&implications);

    let closure = implying_closure(&index, "a", "");
    let implying: Vec<&str> = closure
        .iter()
        .map(|implication| implication.implying_tag.name.as_str())
        .collect();
    assert_eq!(implying, vec!["b", "a", "c"]);

    let expanded = expand_leaf(Expression::tag("a"), "a", "", &index);
    assert_eq!(expanded.to_string(), "a or b or a or c");
}

#[test]
fn value_implications_produce_comparison_terms() {
    let rating = tag(1, "rating");
    let good = tag(2, "good");
    let favourite = tag(3, "favourite");
    let five = value(10, "5");
    let implications = vec![
        Implication {
            implying_tag: rating.clone(),
            implying_value: Some(five.clone()),
            implied_tag: good.clone(),
            implied_value: None,
        },
        Implication {
            implying_tag: favourite.clone(),
            implying_value: None,
            implied_tag: rating.clone(),
            implied_value: Some(five.clone()),
        },
    ];

    assert_eq!(
        expand_implications(Expression::tag("good"), &implications).to_string(),
        "good or rating = 5 or favourite"
    );
    assert_eq!(
        expand_implications(Expression::equals("rating", "5"), &implications).to_string(),
        "rating = 5 or favourite"
    );
    // A bare tag leaf targets the valueless pair only.
    assert_eq!(
        expand_implications(Expression::tag("rating"), &implications),
        Expression::tag("rating")
    );
}

#[test]
fn non_equality_comparisons_are_left_untouched() {
    let size = tag(1, "size");
    let big = tag(2, "big");
    let hundred = value(7, "100");
    let implications = vec![
        implies(&big, &size),
        Implication {
            implying_tag: big.clone(),
            implying_value: None,
            implied_tag: size.clone(),
            implied_value: Some(hundred),
        },
    ];

    for op in [
        ComparisonOp::Gt,
        ComparisonOp::Lt,
        ComparisonOp::Ge,
        ComparisonOp::Le,
        ComparisonOp::Ne,
    ] {
        let leaf = Expression::compare("size", op, "100");
        assert_eq!(expand_implications(leaf.clone(), &implications), leaf);
    }
}

#[test]
fn boolean_structure_is_preserved() {
    let animal = tag(1, "animal");
    let dog = tag(2, "dog");
    let implications = vec![implies(&dog, &animal)];

    let query = Expression::tag("animal")
        .and(Expression::tag("photo").not())
        .or(Expression::Empty);
    let expanded = expand_implications(query, &implications);

    assert_eq!(
        expanded,
        Expression::tag("animal")
            .or(Expression::tag("dog"))
            .and(Expression::tag("photo").not())
            .or(Expression::Empty)
    );
    assert_eq!(expand_implications(Expression::Empty, &implications), Expression::Empty);
}

#[test]
fn index_lookup_matches_implied_value() {
    let rating = tag(1, "rating");
    let star = tag(2, "star");
    let implications = vec![
        implies(&star, &rating),
        Implication {
            implying_tag: star.clone(),
            implying_value: None,
            implied_tag: rating.clone(),
            implied_value: Some(value(3, "5")),
        },
    ];
    let index = ImplicationIndex::new(&implications);
    assert_eq!(index.len(), 2);
    assert_eq!(index.that_imply("rating", "").count(), 1);
    assert_eq!(index.that_imply("rating", "5").count(), 1);
    assert_eq!(index.that_imply("rating", "4").count(), 0);
    assert_eq!(index.that_imply("star", "").count(), 0);
}

fn arbitrary_graph() -> impl Strategy<Value = Vec<(i64, i64)>> {
    prop::collection::vec((1i64..=6, 1i64..=6), 0..24)
}

fn reaches(edges: &BTreeSet<(i64, i64)>, target: i64) -> BTreeSet<i64> {
    let mut found = BTreeSet::new();
    let mut stack = vec![target];
    while let Some(current) = stack.pop() {
        for (from, to) in edges {
            if *to == current && found.insert(*from) {
                stack.push(*from);
            }
        }
    }
    found
}

proptest! {
    #[test]
    fn closure_visits_each_reaching_pair_exactly_once(raw in arbitrary_graph(), target in 1i64..=6) {
        let edges: BTreeSet<(i64, i64)> = raw.into_iter().collect();
        let tags: Vec<Tag> = (0..=6).map(|id| tag(id, &format!("t{id}"))).collect();
        let implications: Vec<Implication> = edges
            .iter()
            .map(|(from, to)| implies(&tags[*from as usize], &tags[*to as usize]))
            .collect();
        let index = ImplicationIndex::new(&implications);

        let closure = implying_closure(&index, &format!("t{target}"), "");
        let implying: Vec<i64> = closure.iter().map(|i| i.implying_tag.id.get()).collect();
        let distinct: BTreeSet<i64> = implying.iter().copied().collect();

        prop_assert_eq!(implying.len(), distinct.len());
        prop_assert_eq!(distinct, reaches(&edges, target));
    }
}
