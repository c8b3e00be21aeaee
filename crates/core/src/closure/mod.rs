#![forbid(unsafe_code)]

//! Rewrites a query so that files matching it only through a chain of
//! implications are matched by plain tag lookups.
//!
//! Each `Tag` leaf and each `tag = value` leaf becomes a disjunction of
//! itself and every pair that transitively implies it. Implication graphs
//! may contain cycles; each implying pair is expanded at most once.

use crate::entities::{Implication, TagValuePair};
use crate::query::Expression;
use std::collections::{HashMap, HashSet, VecDeque};

/// Implications grouped by the name of the tag they imply.
///
/// Built once per query; bucket order follows the order of the input slice.
#[derive(Debug, Default)]
pub struct ImplicationIndex<'a> {
    by_implied_tag: HashMap<&'a str, Vec<&'a Implication>>,
    len: usize,
}

impl<'a> ImplicationIndex<'a> {
    pub fn new(implications: &'a [Implication]) -> Self {
        let mut by_implied_tag: HashMap<&'a str, Vec<&'a Implication>> = HashMap::new();
        for implication in implications {
            by_implied_tag
                .entry(implication.implied_tag.name.as_str())
                .or_default()
                .push(implication);
        }
        Self {
            by_implied_tag,
            len: implications.len(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Implications whose implied side is exactly `tag_name[=value_name]` (empty value name: no value).
    pub fn that_imply(
        &self,
        tag_name: &str,
        value_name: &str,
    ) -> impl Iterator<Item = &'a Implication> {
        self.by_implied_tag
            .get(tag_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .copied()
            .filter(move |implication| implication.implied_value_name() == value_name)
    }
}

/// Every implication reachable backwards from `tag_name[=value_name]`, in breadth-first
/// discovery order, with at most one entry per implying pair.
pub fn implying_closure<'a>(
    index: &ImplicationIndex<'a>,
    tag_name: &str,
    value_name: &str,
) -> Vec<&'a Implication> {
    let mut seen: HashSet<TagValuePair> = HashSet::new();
    let mut queue: VecDeque<&'a Implication> = VecDeque::new();

    for implication in index.that_imply(tag_name, value_name) {
        if seen.insert(implication.implying_pair()) {
            queue.push_back(implication);
        }
    }

    let mut out = Vec::new();
    while let Some(implication) = queue.pop_front() {
        out.push(implication);
        let further = index.that_imply(
            &implication.implying_tag.name,
            implication.implying_value_name(),
        );
        for candidate in further {
            if seen.insert(candidate.implying_pair()) {
                queue.push_back(candidate);
            }
        }
    }
    out
}

/// ORs `leaf` with one term per implying pair that reaches `tag_name[=value_name]`.
pub fn expand_leaf(
    leaf: Expression,
    tag_name: &str,
    value_name: &str,
    index: &ImplicationIndex<'_>,
) -> Expression {
    fold_terms(leaf, implying_closure(index, tag_name, value_name))
}

fn implying_term(implication: &Implication) -> Expression {
    match &implication.implying_value {
        None => Expression::tag(implication.implying_tag.name.clone()),
        Some(value) => Expression::equals(implication.implying_tag.name.clone(), value.name.clone()),
    }
}

/// Rewrites `expression` so that matching it without implications is equivalent to
/// matching the input with implications applied.
pub fn expand_implications(expression: Expression, implications: &[Implication]) -> Expression {
    let index = ImplicationIndex::new(implications);
    expand_with_index(expression, &index)
}

pub fn expand_with_index(expression: Expression, index: &ImplicationIndex<'_>) -> Expression {
    if index.is_empty() {
        return expression;
    }
    expand(expression, index)
}

fn expand(expression: Expression, index: &ImplicationIndex<'_>) -> Expression {
    match expression {
        Expression::Empty => Expression::Empty,
        Expression::Tag(name) => {
            let terms = implying_closure(index, &name, "");
            fold_terms(Expression::Tag(name), terms)
        }
        Expression::Comparison { tag, op, value } if op.is_equality() => {
            let terms = implying_closure(index, &tag, &value);
            fold_terms(Expression::Comparison { tag, op, value }, terms)
        }
        comparison @ Expression::Comparison { .. } => comparison,
        Expression::And(left, right) => Expression::And(
            Box::new(expand(*left, index)),
            Box::new(expand(*right, index)),
        ),
        Expression::Or(left, right) => Expression::Or(
            Box::new(expand(*left, index)),
            Box::new(expand(*right, index)),
        ),
        Expression::Not(operand) => Expression::Not(Box::new(expand(*operand, index))),
    }
}

fn fold_terms(leaf: Expression, terms: Vec<&Implication>) -> Expression {
    terms
        .into_iter()
        .fold(leaf, |accumulated, implication| {
            accumulated.or(implying_term(implication))
        })
}

#[cfg(test)]
mod tests;
