//! Condition evaluation.
//!
//! Values of the same kind compare by their natural order: numbers
//! numerically, booleans with `false < true`, strings lexicographically by
//! byte. Values of different kinds are never coerced: `==` is false, `!=` is
//! true, and the ordering operators fail with `IncomparableValues`.

use std::cmp::Ordering;

use ravel_core::error::{RavelError, Result};
use ravel_core::types::{Condition, Operator, Value};

use crate::controller::DialogController;

/// Resolve both operands of `condition`, in order, then compare them.
pub async fn evaluate(condition: &Condition, controller: &DialogController) -> Result<bool> {
    let left = controller.resolve_value(&condition.value1).await?;
    let right = controller.resolve_value(&condition.value2).await?;
    let operator: Operator = condition.operator.parse()?;

    compare(operator, &left, &right)
}

/// Apply a relational operator to two resolved values.
pub fn compare(operator: Operator, left: &Value, right: &Value) -> Result<bool> {
    let ordering = match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => {
            return match operator {
                Operator::Eq => Ok(false),
                Operator::Ne => Ok(true),
                _ => Err(RavelError::IncomparableValues {
                    left: left.kind().to_string(),
                    right: right.kind().to_string(),
                }),
            }
        }
    };

    // NaN is unordered: only `!=` holds.
    let Some(ordering) = ordering else {
        return Ok(operator == Operator::Ne);
    };

    Ok(match operator {
        Operator::Lt => ordering == Ordering::Less,
        Operator::Le => ordering != Ordering::Greater,
        Operator::Eq => ordering == Ordering::Equal,
        Operator::Ne => ordering != Ordering::Equal,
        Operator::Ge => ordering != Ordering::Less,
        Operator::Gt => ordering == Ordering::Greater,
    })
}
