use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::RavelError;

/// Identifier of a node, unique within one dialog.
pub type NodeId = i64;

/// Reserved next-node id that ends a run. Never a real node.
pub const TERMINAL_NODE: NodeId = -1;

/// Whether a handler's returned next id ends the run: absent, `0`, or
/// [`TERMINAL_NODE`]. A node with id `0` can still be the start node, but no
/// edge can lead into it.
pub fn ends_run(next: Option<NodeId>) -> bool {
    matches!(next, None | Some(0) | Some(TERMINAL_NODE))
}

/// Integral numbers below this magnitude print without a fractional part.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Unique identifier of a single dialog run.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A primitive dialog value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(String),
}

impl Value {
    /// Name of the primitive kind, matching the `returnType` vocabulary.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < MAX_EXACT_INTEGER => {
                write!(f, "{}", *n as i64)
            }
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// A value used by conditions and function parameters: either a literal, or
/// the result of invoking a returning function node.
///
/// On the wire this is `{"value": ...}` or `{"sourceNodeId": ...}`; exactly
/// one of the two must be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawValueRef", into = "RawValueRef")]
pub enum ValueRef {
    Literal(Value),
    Source(NodeId),
}

impl ValueRef {
    pub fn literal(value: impl Into<Value>) -> Self {
        ValueRef::Literal(value.into())
    }

    pub fn source(node: NodeId) -> Self {
        ValueRef::Source(node)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawValueRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_node_id: Option<NodeId>,
}

impl TryFrom<RawValueRef> for ValueRef {
    type Error = String;

    fn try_from(raw: RawValueRef) -> std::result::Result<Self, Self::Error> {
        match (raw.value, raw.source_node_id) {
            (Some(value), None) => Ok(ValueRef::Literal(value)),
            (None, Some(id)) => Ok(ValueRef::Source(id)),
            (Some(_), Some(_)) => Err("value reference has both value and sourceNodeId".into()),
            (None, None) => Err("value reference needs either value or sourceNodeId".into()),
        }
    }
}

impl From<ValueRef> for RawValueRef {
    fn from(v: ValueRef) -> Self {
        match v {
            ValueRef::Literal(value) => RawValueRef {
                value: Some(value),
                source_node_id: None,
            },
            ValueRef::Source(id) => RawValueRef {
                value: None,
                source_node_id: Some(id),
            },
        }
    }
}

/// Relational operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Ge => ">=",
            Operator::Gt => ">",
        }
    }
}

impl FromStr for Operator {
    type Err = RavelError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "<" => Ok(Operator::Lt),
            "<=" => Ok(Operator::Le),
            "==" => Ok(Operator::Eq),
            "!=" => Ok(Operator::Ne),
            ">=" => Ok(Operator::Ge),
            ">" => Ok(Operator::Gt),
            other => Err(RavelError::UnsupportedOperator(other.to_string())),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A binary comparison between two value references.
///
/// The operator is kept as written in the dialog and parsed when the
/// condition is evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub operator: String,
    pub value1: ValueRef,
    pub value2: ValueRef,
}

impl Condition {
    pub fn new(operator: impl Into<String>, value1: ValueRef, value2: ValueRef) -> Self {
        Self {
            operator: operator.into(),
            value1,
            value2,
        }
    }
}

/// Declared return type of a function node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReturnType {
    Void,
    Number,
    Boolean,
    String,
}

impl ReturnType {
    /// Whether `value` is of the kind this return type declares.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ReturnType::Number, Value::Number(_))
                | (ReturnType::Boolean, Value::Bool(_))
                | (ReturnType::String, Value::String(_))
        )
    }
}

impl fmt::Display for ReturnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReturnType::Void => "void",
            ReturnType::Number => "number",
            ReturnType::Boolean => "boolean",
            ReturnType::String => "string",
        };
        f.write_str(s)
    }
}

/// Events emitted while a dialog runs.
#[derive(Debug, Clone)]
pub enum RunEvent {
    RunStarted { run_id: RunId, start: NodeId },
    NodeEntered {
        run_id: RunId,
        node_id: NodeId,
        node_type: String,
    },
    MethodInvoked { run_id: RunId, method: String },
    RunTerminated { run_id: RunId, steps: usize },
    RunFailed { run_id: RunId, error: String },
}

/// Summary of a completed run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub run_id: RunId,
    /// Visited node ids in traversal order, starting with the start node.
    pub path: Vec<NodeId>,
    /// Number of handler dispatches.
    pub steps: usize,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}
