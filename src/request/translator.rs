//! Query translation
//!
//! Deterministic, side-effect-free conversion of a query description
//! into a [`SearchRequest`] plus the [`Materializer`] bound to the
//! expected result shape. A fresh translation is produced per
//! execution; a new description may yield a different materializer.

use crate::mapping::FieldMapping;
use crate::query::{Criteria, QueryDescription, QueryOperation};
use crate::response::Materializer;

use super::errors::{TranslateError, TranslateResult};
use super::model::{AggregateSpec, SearchRequest, SortField};

/// The outcome of translating one query description
#[derive(Debug, Clone)]
pub struct Translation {
    /// Transport-level request
    pub request: SearchRequest,
    /// Strategy for converting the raw response into the typed result
    pub materializer: Materializer,
}

/// Translates a description under the given mapping
///
/// The criteria tree is field-mapped and then simplified, so a filter
/// that collapses to the always-false sentinel is visible to the
/// short-circuit test in the orchestrator.
pub fn translate(
    mapping: &dyn FieldMapping,
    description: &QueryDescription,
) -> TranslateResult<Translation> {
    let type_name = description.target.as_str();

    let criteria =
        map_criteria(mapping, type_name, description.criteria.clone())?.simplify();

    let fields = match &description.projection {
        Some(projection) => Some(
            projection
                .iter()
                .map(|f| mapped_field(mapping, type_name, f))
                .collect::<TranslateResult<Vec<_>>>()?,
        ),
        None => None,
    };

    let sort = description
        .sort
        .iter()
        .map(|key| {
            Ok(SortField {
                field: mapped_field(mapping, type_name, &key.field)?,
                descending: key.direction == crate::query::SortDirection::Desc,
            })
        })
        .collect::<TranslateResult<Vec<_>>>()?;

    let (take, aggregate, materializer) = match &description.operation {
        QueryOperation::Fetch => (description.take, None, Materializer::Documents),
        QueryOperation::First { or_default } => (
            Some(1),
            None,
            Materializer::SingleDocument {
                or_default: *or_default,
            },
        ),
        QueryOperation::Count => (Some(0), Some(AggregateSpec::Count), Materializer::Count),
        QueryOperation::Min { field } => {
            let field = mapped_aggregate_field(mapping, type_name, field)?;
            (
                Some(0),
                Some(AggregateSpec::Min {
                    field: field.clone(),
                }),
                Materializer::Aggregate { key: field },
            )
        }
        QueryOperation::Max { field } => {
            let field = mapped_aggregate_field(mapping, type_name, field)?;
            (
                Some(0),
                Some(AggregateSpec::Max {
                    field: field.clone(),
                }),
                Materializer::Aggregate { key: field },
            )
        }
    };

    Ok(Translation {
        request: SearchRequest {
            collection: mapping.collection(type_name),
            criteria,
            fields,
            sort,
            skip: description.skip,
            take,
            aggregate,
        },
        materializer,
    })
}

fn mapped_field(
    mapping: &dyn FieldMapping,
    type_name: &str,
    field: &str,
) -> TranslateResult<String> {
    if field.is_empty() {
        return Err(TranslateError::EmptyCriteriaField);
    }
    Ok(mapping.field(type_name, field))
}

fn mapped_aggregate_field(
    mapping: &dyn FieldMapping,
    type_name: &str,
    field: &str,
) -> TranslateResult<String> {
    if field.is_empty() {
        return Err(TranslateError::EmptyAggregateField);
    }
    Ok(mapping.field(type_name, field))
}

/// Rewrites criteria leaf field names through the mapping
fn map_criteria(
    mapping: &dyn FieldMapping,
    type_name: &str,
    criteria: Criteria,
) -> TranslateResult<Criteria> {
    Ok(match criteria {
        Criteria::Always => Criteria::Always,
        Criteria::Never => Criteria::Never,
        Criteria::Term { field, value } => Criteria::Term {
            field: mapped_field(mapping, type_name, &field)?,
            value,
        },
        Criteria::Terms { field, values } => Criteria::Terms {
            field: mapped_field(mapping, type_name, &field)?,
            values,
        },
        Criteria::Range { field, op, value } => Criteria::Range {
            field: mapped_field(mapping, type_name, &field)?,
            op,
            value,
        },
        Criteria::Exists { field } => Criteria::Exists {
            field: mapped_field(mapping, type_name, &field)?,
        },
        Criteria::Prefix { field, value } => Criteria::Prefix {
            field: mapped_field(mapping, type_name, &field)?,
            value,
        },
        Criteria::And { criteria } => Criteria::And {
            criteria: criteria
                .into_iter()
                .map(|c| map_criteria(mapping, type_name, c))
                .collect::<TranslateResult<Vec<_>>>()?,
        },
        Criteria::Or { criteria } => Criteria::Or {
            criteria: criteria
                .into_iter()
                .map(|c| map_criteria(mapping, type_name, c))
                .collect::<TranslateResult<Vec<_>>>()?,
        },
        Criteria::Not { criterion } => Criteria::Not {
            criterion: Box::new(map_criteria(mapping, type_name, *criterion)?),
        },
    })
}
