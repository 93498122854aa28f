//! Filter criteria tree
//!
//! A recursive boolean expression over document fields. The constant
//! [`Criteria::Never`] is the always-false sentinel: a request whose
//! whole filter collapses to `Never` has a known-empty result set and is
//! never sent over the network.
//!
//! No type coercion: a term compares exactly, ranges compare numbers to
//! numbers and strings to strings.

use serde::Serialize;
use serde_json::Value;

/// Range comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeOp {
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
}

impl RangeOp {
    /// Returns the operator name
    pub fn as_str(&self) -> &'static str {
        match self {
            RangeOp::Gt => "gt",
            RangeOp::Gte => "gte",
            RangeOp::Lt => "lt",
            RangeOp::Lte => "lte",
        }
    }
}

/// Recursive boolean filter expression
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Criteria {
    /// Matches every document
    Always,
    /// Matches no document (the short-circuit sentinel)
    Never,
    /// Exact field equality
    Term { field: String, value: Value },
    /// Field equals any of the given values
    Terms { field: String, values: Vec<Value> },
    /// Field compares against a bound
    Range {
        field: String,
        op: RangeOp,
        value: Value,
    },
    /// Field is present and non-null
    Exists { field: String },
    /// String field starts with a literal prefix
    Prefix { field: String, value: String },
    /// Every arm must match
    And { criteria: Vec<Criteria> },
    /// Any arm may match
    Or { criteria: Vec<Criteria> },
    /// Inner criterion must not match
    Not { criterion: Box<Criteria> },
}

impl Criteria {
    /// Exact equality criterion
    pub fn term(field: impl Into<String>, value: Value) -> Self {
        Criteria::Term {
            field: field.into(),
            value,
        }
    }

    /// Membership criterion
    pub fn terms(field: impl Into<String>, values: Vec<Value>) -> Self {
        Criteria::Terms {
            field: field.into(),
            values,
        }
    }

    /// Range criterion
    pub fn range(field: impl Into<String>, op: RangeOp, value: Value) -> Self {
        Criteria::Range {
            field: field.into(),
            op,
            value,
        }
    }

    /// Presence criterion
    pub fn exists(field: impl Into<String>) -> Self {
        Criteria::Exists {
            field: field.into(),
        }
    }

    /// Prefix criterion
    pub fn prefix(field: impl Into<String>, value: impl Into<String>) -> Self {
        Criteria::Prefix {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Conjunction of the given arms
    pub fn all(criteria: Vec<Criteria>) -> Self {
        Criteria::And { criteria }
    }

    /// Disjunction of the given arms
    pub fn any(criteria: Vec<Criteria>) -> Self {
        Criteria::Or { criteria }
    }

    /// Negation
    pub fn negate(self) -> Self {
        Criteria::Not {
            criterion: Box::new(self),
        }
    }

    /// Conjoins another criterion onto this one
    pub fn and(self, other: Criteria) -> Self {
        match self {
            Criteria::And { mut criteria } => {
                criteria.push(other);
                Criteria::And { criteria }
            }
            first => Criteria::And {
                criteria: vec![first, other],
            },
        }
    }

    /// Returns true if this is the always-false sentinel
    pub fn is_never(&self) -> bool {
        matches!(self, Criteria::Never)
    }

    /// Deterministic constant folding
    ///
    /// - `And` containing `Never` collapses to `Never`; `Always` arms drop
    /// - `Or` containing `Always` collapses to `Always`; `Never` arms drop
    /// - empty `And` is `Always`, empty `Or` is `Never`
    /// - single-armed combinators unwrap; nested same-kind combinators flatten
    /// - `Not` folds constants and double negation
    pub fn simplify(self) -> Self {
        match self {
            Criteria::And { criteria } => {
                let mut folded = Vec::with_capacity(criteria.len());
                for arm in criteria {
                    match arm.simplify() {
                        Criteria::Never => return Criteria::Never,
                        Criteria::Always => {}
                        Criteria::And { criteria: inner } => folded.extend(inner),
                        other => folded.push(other),
                    }
                }
                if folded.is_empty() {
                    Criteria::Always
                } else if folded.len() == 1 {
                    folded.remove(0)
                } else {
                    Criteria::And { criteria: folded }
                }
            }
            Criteria::Or { criteria } => {
                let mut folded = Vec::with_capacity(criteria.len());
                for arm in criteria {
                    match arm.simplify() {
                        Criteria::Always => return Criteria::Always,
                        Criteria::Never => {}
                        Criteria::Or { criteria: inner } => folded.extend(inner),
                        other => folded.push(other),
                    }
                }
                if folded.is_empty() {
                    Criteria::Never
                } else if folded.len() == 1 {
                    folded.remove(0)
                } else {
                    Criteria::Or { criteria: folded }
                }
            }
            Criteria::Not { criterion } => match criterion.simplify() {
                Criteria::Always => Criteria::Never,
                Criteria::Never => Criteria::Always,
                Criteria::Not { criterion: inner } => *inner,
                other => Criteria::Not {
                    criterion: Box::new(other),
                },
            },
            leaf => leaf,
        }
    }

    /// Checks a document against this criterion
    ///
    /// Missing fields and null values never match a leaf. Used by the
    /// in-memory connection; a remote service applies its own semantics
    /// server-side.
    pub fn matches(&self, document: &Value) -> bool {
        match self {
            Criteria::Always => true,
            Criteria::Never => false,
            Criteria::Term { field, value } => {
                Self::leaf_value(document, field).is_some_and(|v| v == value)
            }
            Criteria::Terms { field, values } => {
                Self::leaf_value(document, field).is_some_and(|v| values.contains(v))
            }
            Criteria::Range { field, op, value } => {
                Self::leaf_value(document, field).is_some_and(|v| Self::range_match(v, *op, value))
            }
            Criteria::Exists { field } => Self::leaf_value(document, field).is_some(),
            Criteria::Prefix { field, value } => Self::leaf_value(document, field)
                .and_then(Value::as_str)
                .is_some_and(|s| s.starts_with(value.as_str())),
            Criteria::And { criteria } => criteria.iter().all(|c| c.matches(document)),
            Criteria::Or { criteria } => criteria.iter().any(|c| c.matches(document)),
            Criteria::Not { criterion } => !criterion.matches(document),
        }
    }

    fn leaf_value<'a>(document: &'a Value, field: &str) -> Option<&'a Value> {
        match document.get(field) {
            Some(Value::Null) | None => None,
            Some(v) => Some(v),
        }
    }

    /// Range comparison without coercion: numbers against numbers,
    /// strings against strings
    fn range_match(actual: &Value, op: RangeOp, bound: &Value) -> bool {
        let ordering = match (actual, bound) {
            (Value::Number(a), Value::Number(b)) => {
                match (a.as_f64(), b.as_f64()) {
                    (Some(af), Some(bf)) => af.partial_cmp(&bf),
                    _ => None,
                }
            }
            (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
            _ => None,
        };
        let Some(ordering) = ordering else {
            return false;
        };
        match op {
            RangeOp::Gt => ordering.is_gt(),
            RangeOp::Gte => ordering.is_ge(),
            RangeOp::Lt => ordering.is_lt(),
            RangeOp::Lte => ordering.is_le(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_and_with_never_collapses() {
        let criteria = Criteria::all(vec![
            Criteria::term("zone", json!(3)),
            Criteria::Never,
        ]);
        assert_eq!(criteria.simplify(), Criteria::Never);
    }

    #[test]
    fn test_or_of_all_never_collapses() {
        let criteria = Criteria::any(vec![Criteria::Never, Criteria::Never]);
        assert_eq!(criteria.simplify(), Criteria::Never);
    }

    #[test]
    fn test_or_with_always_collapses() {
        let criteria = Criteria::any(vec![Criteria::term("zone", json!(3)), Criteria::Always]);
        assert_eq!(criteria.simplify(), Criteria::Always);
    }

    #[test]
    fn test_empty_combinators() {
        assert_eq!(Criteria::all(vec![]).simplify(), Criteria::Always);
        assert_eq!(Criteria::any(vec![]).simplify(), Criteria::Never);
    }

    #[test]
    fn test_single_arm_unwraps() {
        let term = Criteria::term("zone", json!(3));
        assert_eq!(Criteria::all(vec![term.clone()]).simplify(), term);
    }

    #[test]
    fn test_nested_and_flattens() {
        let inner = Criteria::all(vec![
            Criteria::term("a", json!(1)),
            Criteria::term("b", json!(2)),
        ]);
        let outer = Criteria::all(vec![inner, Criteria::term("c", json!(3))]).simplify();
        match outer {
            Criteria::And { criteria } => assert_eq!(criteria.len(), 3),
            other => panic!("expected flattened And, got {:?}", other),
        }
    }

    #[test]
    fn test_not_constant_folding() {
        assert_eq!(Criteria::Always.negate().simplify(), Criteria::Never);
        assert_eq!(Criteria::Never.negate().simplify(), Criteria::Always);

        let term = Criteria::term("zone", json!(3));
        assert_eq!(term.clone().negate().negate().simplify(), term);
    }

    #[test]
    fn test_and_builder_accumulates() {
        let criteria = Criteria::term("zone", json!(3))
            .and(Criteria::exists("name"))
            .and(Criteria::prefix("name", "ro"));
        match criteria {
            Criteria::And { criteria } => assert_eq!(criteria.len(), 3),
            other => panic!("expected And, got {:?}", other),
        }
    }

    #[test]
    fn test_term_match_no_coercion() {
        let doc = json!({"value": 123});
        assert!(Criteria::term("value", json!(123)).matches(&doc));
        assert!(!Criteria::term("value", json!("123")).matches(&doc));
    }

    #[test]
    fn test_terms_match() {
        let doc = json!({"zone": 2});
        assert!(Criteria::terms("zone", vec![json!(1), json!(2)]).matches(&doc));
        assert!(!Criteria::terms("zone", vec![json!(3)]).matches(&doc));
    }

    #[test]
    fn test_range_match() {
        let doc = json!({"cost": 25});
        assert!(Criteria::range("cost", RangeOp::Gte, json!(18)).matches(&doc));
        assert!(Criteria::range("cost", RangeOp::Lte, json!(30)).matches(&doc));
        assert!(!Criteria::range("cost", RangeOp::Gt, json!(25)).matches(&doc));
        assert!(!Criteria::range("cost", RangeOp::Lt, json!(25)).matches(&doc));
    }

    #[test]
    fn test_range_strings() {
        let doc = json!({"name": "mango"});
        assert!(Criteria::range("name", RangeOp::Gt, json!("apple")).matches(&doc));
        assert!(!Criteria::range("name", RangeOp::Gt, json!("zebra")).matches(&doc));
    }

    #[test]
    fn test_missing_and_null_fields_never_match() {
        let doc = json!({"name": null});
        assert!(!Criteria::term("name", json!("x")).matches(&doc));
        assert!(!Criteria::term("age", json!(1)).matches(&doc));
        assert!(!Criteria::exists("name").matches(&doc));
        assert!(!Criteria::exists("age").matches(&doc));
    }

    #[test]
    fn test_boolean_composition_matches() {
        let doc = json!({"zone": 3, "name": "rover"});
        let criteria = Criteria::all(vec![
            Criteria::term("zone", json!(3)),
            Criteria::any(vec![
                Criteria::prefix("name", "ro"),
                Criteria::term("name", json!("dalek")),
            ]),
        ]);
        assert!(criteria.matches(&doc));
        assert!(!criteria.clone().negate().matches(&doc));
    }
}
