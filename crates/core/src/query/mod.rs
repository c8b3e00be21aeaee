#![forbid(unsafe_code)]

//! Boolean query tree over tags and tag values.
//!
//! Trees are produced by the query-language parser and consumed by the
//! implication expander and the storage layer's SQL translator.

use std::fmt;
use std::str::FromStr;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl ComparisonOp {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
        }
    }

    /// Implications only establish equality facts; every other operator is left alone.
    pub fn is_equality(self) -> bool {
        matches!(self, Self::Eq)
    }

    pub fn is_ordering(self) -> bool {
        matches!(self, Self::Lt | Self::Gt | Self::Le | Self::Ge)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownOperator(pub String);

impl fmt::Display for UnknownOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown comparison operator '{}'", self.0)
    }
}

impl std::error::Error for UnknownOperator {}

impl FromStr for ComparisonOp {
    type Err = UnknownOperator;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "=" | "==" | "eq" => Ok(Self::Eq),
            "!=" | "ne" => Ok(Self::Ne),
            "<" | "lt" => Ok(Self::Lt),
            ">" | "gt" => Ok(Self::Gt),
            "<=" | "le" => Ok(Self::Le),
            ">=" | "ge" => Ok(Self::Ge),
            _ => Err(UnknownOperator(raw.to_string())),
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expression {
    /// No constraint: every file matches.
    Empty,
    Tag(String),
    Comparison {
        tag: String,
        op: ComparisonOp,
        value: String,
    },
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
}

impl Expression {
    pub fn tag(name: impl Into<String>) -> Self {
        Self::Tag(name.into())
    }

    pub fn compare(tag: impl Into<String>, op: ComparisonOp, value: impl Into<String>) -> Self {
        Self::Comparison {
            tag: tag.into(),
            op,
            value: value.into(),
        }
    }

    pub fn equals(tag: impl Into<String>, value: impl Into<String>) -> Self {
        Self::compare(tag, ComparisonOp::Eq, value)
    }

    pub fn and(self, rhs: Expression) -> Self {
        Self::And(Box::new(self), Box::new(rhs))
    }

    pub fn or(self, rhs: Expression) -> Self {
        Self::Or(Box::new(self), Box::new(rhs))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Distinct tag names referenced by the tree, in first-seen order.
    pub fn tag_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_tag_names(&mut out);
        out
    }

    fn collect_tag_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Empty => {}
            Self::Tag(name) | Self::Comparison { tag: name, .. } => {
                if !out.contains(&name.as_str()) {
                    out.push(name.as_str());
                }
            }
            Self::And(left, right) | Self::Or(left, right) => {
                left.collect_tag_names(out);
                right.collect_tag_names(out);
            }
            Self::Not(operand) => operand.collect_tag_names(out),
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Self::Or(..) => 1,
            Self::And(..) => 2,
            Self::Not(..) => 3,
            Self::Empty | Self::Tag(_) | Self::Comparison { .. } => 4,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, min_precedence: u8) -> fmt::Result {
        if self.precedence() < min_precedence {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Tag(name) => f.write_str(name),
            Self::Comparison { tag, op, value } => write!(f, "{tag} {op} {value}"),
            // Left-associative: only a right-hand operand of the same kind needs grouping.
            Self::Or(left, right) => {
                left.fmt_operand(f, 1)?;
                f.write_str(" or ")?;
                right.fmt_operand(f, 2)
            }
            Self::And(left, right) => {
                left.fmt_operand(f, 2)?;
                f.write_str(" and ")?;
                right.fmt_operand(f, 3)
            }
            Self::Not(operand) => {
                f.write_str("not ")?;
                operand.fmt_operand(f, 3)
            }
        }
    }
}
