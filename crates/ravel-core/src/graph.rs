//! Dialog graph model.
//!
//! A dialog is an ordered list of nodes. Each node has a unique id and a type
//! tag; the built-in types are decoded into typed variants, anything else is
//! kept as a [`CustomNode`] so that extension handlers can interpret it.
//! The graph is immutable once built.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::{RavelError, Result};
use crate::types::{Condition, NodeId, ReturnType, ValueRef, TERMINAL_NODE};

/// Type tags decoded into built-in [`NodeKind`] variants.
pub const BUILTIN_NODE_TYPES: &[&str] = &[
    "start",
    "end",
    "text",
    "choice",
    "if",
    "function",
    "delay",
    "randomSelector",
    "switch",
];

#[derive(Debug, Clone, Deserialize)]
pub struct StartNode {
    pub next: NodeId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndNode {
    #[serde(default = "terminal")]
    pub next: NodeId,
}

fn terminal() -> NodeId {
    TERMINAL_NODE
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextNode {
    pub text: String,
    pub next: NodeId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceOption {
    pub text: String,
    pub next: NodeId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceNode {
    pub prompt: String,
    pub choices: Vec<ChoiceOption>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IfNode {
    pub condition: Condition,
    pub true_branch: NodeId,
    pub false_branch: NodeId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionNode {
    pub method_name: String,
    pub return_type: ReturnType,
    #[serde(default)]
    pub parameters: Vec<ValueRef>,
    /// Continuation; only meaningful for `void` functions.
    #[serde(default)]
    pub next: Option<NodeId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DelayNode {
    /// Suspension length, in the engine's configured delay unit. May be
    /// fractional; negative and NaN lengths fail when the node runs.
    pub length: f64,
    pub next: NodeId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RandomSelectorNode {
    pub branches: Vec<NodeId>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SwitchCase {
    pub condition: Condition,
    pub next: NodeId,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchNode {
    /// Carried for authoring tools; each case holds its own condition.
    #[serde(default)]
    pub switch_value: Option<ValueRef>,
    pub cases: Vec<SwitchCase>,
    pub default_case: NodeId,
}

/// A node whose type is not built in. `body` is the full JSON object.
#[derive(Debug, Clone)]
pub struct CustomNode {
    pub type_tag: String,
    pub body: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum NodeKind {
    #[serde(rename = "start")]
    Start(StartNode),
    #[serde(rename = "end")]
    End(EndNode),
    #[serde(rename = "text")]
    Text(TextNode),
    #[serde(rename = "choice")]
    Choice(ChoiceNode),
    #[serde(rename = "if")]
    If(IfNode),
    #[serde(rename = "function")]
    Function(FunctionNode),
    #[serde(rename = "delay")]
    Delay(DelayNode),
    #[serde(rename = "randomSelector")]
    RandomSelector(RandomSelectorNode),
    #[serde(rename = "switch")]
    Switch(SwitchNode),
    #[serde(skip_deserializing)]
    Custom(CustomNode),
}

impl NodeKind {
    /// The type tag used to dispatch this node.
    pub fn type_tag(&self) -> &str {
        match self {
            NodeKind::Start(_) => "start",
            NodeKind::End(_) => "end",
            NodeKind::Text(_) => "text",
            NodeKind::Choice(_) => "choice",
            NodeKind::If(_) => "if",
            NodeKind::Function(_) => "function",
            NodeKind::Delay(_) => "delay",
            NodeKind::RandomSelector(_) => "randomSelector",
            NodeKind::Switch(_) => "switch",
            NodeKind::Custom(c) => &c.type_tag,
        }
    }
}

/// A node in a dialog graph.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self { id, kind }
    }

    pub fn type_tag(&self) -> &str {
        self.kind.type_tag()
    }

    /// Decode the body of a custom node into an extension's own shape.
    pub fn decode_custom<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        match &self.kind {
            NodeKind::Custom(custom) => {
                serde_json::from_value(custom.body.clone()).map_err(|e| RavelError::InvalidNode {
                    node: self.id,
                    node_type: custom.type_tag.clone(),
                    message: e.to_string(),
                })
            }
            other => Err(RavelError::InvalidNode {
                node: self.id,
                node_type: other.type_tag().to_string(),
                message: "built-in node has no custom body".to_string(),
            }),
        }
    }
}

impl TryFrom<serde_json::Value> for Node {
    type Error = String;

    fn try_from(value: serde_json::Value) -> std::result::Result<Self, Self::Error> {
        let id = value
            .get("id")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| "node is missing an integer id".to_string())?;
        let type_tag = value
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| format!("node {} is missing a type tag", id))?
            .to_string();

        let kind = if BUILTIN_NODE_TYPES.contains(&type_tag.as_str()) {
            serde_json::from_value(value).map_err(|e| format!("node {}: {}", id, e))?
        } else {
            NodeKind::Custom(CustomNode {
                type_tag,
                body: value,
            })
        };

        Ok(Node { id, kind })
    }
}

#[derive(Deserialize)]
struct DialogDocument {
    nodes: Vec<Node>,
}

/// An immutable dialog graph.
#[derive(Debug, Clone)]
pub struct Dialog {
    nodes: Vec<Node>,
    index: HashMap<NodeId, usize>,
}

impl Dialog {
    /// Build a dialog from its nodes. When ids repeat, lookups find the
    /// first node carrying the id.
    pub fn new(nodes: Vec<Node>) -> Self {
        let mut index = HashMap::with_capacity(nodes.len());
        for (pos, node) in nodes.iter().enumerate() {
            index.entry(node.id).or_insert(pos);
        }
        Self { nodes, index }
    }

    /// Parse a `{"nodes": [...]}` document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let doc: DialogDocument = serde_json::from_str(json)?;
        Ok(Self::new(doc.nodes))
    }

    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.index
            .get(&id)
            .map(|&pos| &self.nodes[pos])
            .ok_or(RavelError::NodeNotFound(id))
    }

    /// The first node of type `start`.
    pub fn start_node(&self) -> Result<&Node> {
        self.nodes
            .iter()
            .find(|n| matches!(n.kind, NodeKind::Start(_)))
            .ok_or(RavelError::MissingStartNode)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    const HELLO: &str = r#"{
        "nodes": [
            {"id": 0, "type": "start", "next": 1},
            {"id": 1, "type": "text", "text": "Hello", "next": 2},
            {"id": 2, "type": "end"}
        ]
    }"#;

    #[test]
    fn test_parse_and_lookup() {
        let dialog = Dialog::from_json_str(HELLO).unwrap();
        assert_eq!(dialog.len(), 3);
        assert_eq!(dialog.start_node().unwrap().id, 0);

        let text = dialog.get(1).unwrap();
        assert_eq!(text.type_tag(), "text");
        match &text.kind {
            NodeKind::Text(t) => {
                assert_eq!(t.text, "Hello");
                assert_eq!(t.next, 2);
            }
            other => panic!("expected text node, got {:?}", other),
        }

        match &dialog.get(2).unwrap().kind {
            NodeKind::End(end) => assert_eq!(end.next, TERMINAL_NODE),
            other => panic!("expected end node, got {:?}", other),
        }
    }

    #[test]
    fn test_node_not_found() {
        let dialog = Dialog::from_json_str(HELLO).unwrap();
        assert!(matches!(dialog.get(42), Err(RavelError::NodeNotFound(42))));
    }

    #[test]
    fn test_missing_start_node() {
        let dialog = Dialog::from_json_str(r#"{"nodes": [{"id": 1, "type": "end"}]}"#).unwrap();
        assert!(matches!(dialog.start_node(), Err(RavelError::MissingStartNode)));
    }

    #[test]
    fn test_delay_lengths_parse_as_numbers() {
        let json = r#"{"nodes": [
            {"id": 1, "type": "delay", "length": 1.5, "next": 2},
            {"id": 2, "type": "delay", "length": -4, "next": 3}
        ]}"#;
        let dialog = Dialog::from_json_str(json).unwrap();

        for (id, expected) in [(1, 1.5), (2, -4.0)] {
            match &dialog.get(id).unwrap().kind {
                NodeKind::Delay(d) => assert_eq!(d.length, expected),
                other => panic!("expected delay node, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_camel_case_fields() {
        let json = r#"{"nodes": [
            {"id": 3, "type": "if",
             "condition": {"operator": ">", "value1": {"sourceNodeId": 4}, "value2": {"value": 5}},
             "trueBranch": 5, "falseBranch": 6},
            {"id": 4, "type": "function", "methodName": "getTiredLevel", "returnType": "number"},
            {"id": 7, "type": "randomSelector", "branches": [1, 2]},
            {"id": 8, "type": "switch", "switchValue": {"value": 1},
             "cases": [{"condition": {"operator": "==", "value1": {"value": 1}, "value2": {"value": 1}}, "next": 1}],
             "defaultCase": 2}
        ]}"#;
        let dialog = Dialog::from_json_str(json).unwrap();

        match &dialog.get(3).unwrap().kind {
            NodeKind::If(n) => {
                assert_eq!(n.true_branch, 5);
                assert_eq!(n.false_branch, 6);
                assert_eq!(n.condition.value1, ValueRef::Source(4));
                assert_eq!(n.condition.value2, ValueRef::Literal(Value::Number(5.0)));
            }
            other => panic!("expected if node, got {:?}", other),
        }
        match &dialog.get(4).unwrap().kind {
            NodeKind::Function(f) => {
                assert_eq!(f.method_name, "getTiredLevel");
                assert_eq!(f.return_type, ReturnType::Number);
                assert!(f.parameters.is_empty());
                assert!(f.next.is_none());
            }
            other => panic!("expected function node, got {:?}", other),
        }
        assert_eq!(dialog.get(7).unwrap().type_tag(), "randomSelector");
        match &dialog.get(8).unwrap().kind {
            NodeKind::Switch(s) => {
                assert_eq!(s.cases.len(), 1);
                assert_eq!(s.default_case, 2);
            }
            other => panic!("expected switch node, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_kept_as_custom() {
        let json = r#"{"nodes": [
            {"id": 9, "type": "shop", "items": [], "next": 2}
        ]}"#;
        let dialog = Dialog::from_json_str(json).unwrap();
        let node = dialog.get(9).unwrap();
        assert_eq!(node.type_tag(), "shop");
        match &node.kind {
            NodeKind::Custom(c) => assert_eq!(c.body["next"], 2),
            other => panic!("expected custom node, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_custom() {
        #[derive(Debug, Deserialize)]
        struct Banner {
            title: String,
        }

        let json = r#"{"nodes": [{"id": 1, "type": "banner", "title": "Welcome"}]}"#;
        let dialog = Dialog::from_json_str(json).unwrap();
        let banner: Banner = dialog.get(1).unwrap().decode_custom().unwrap();
        assert_eq!(banner.title, "Welcome");

        let bad = r#"{"nodes": [{"id": 1, "type": "banner"}]}"#;
        let dialog = Dialog::from_json_str(bad).unwrap();
        let err = dialog.get(1).unwrap().decode_custom::<Banner>().unwrap_err();
        assert!(matches!(err, RavelError::InvalidNode { node: 1, .. }));
    }

    #[test]
    fn test_missing_id_rejected() {
        assert!(Dialog::from_json_str(r#"{"nodes": [{"type": "start", "next": 1}]}"#).is_err());
    }

    #[test]
    fn test_duplicate_ids_first_wins() {
        let json = r#"{"nodes": [
            {"id": 1, "type": "text", "text": "first", "next": 2},
            {"id": 1, "type": "text", "text": "second", "next": 2}
        ]}"#;
        let dialog = Dialog::from_json_str(json).unwrap();
        match &dialog.get(1).unwrap().kind {
            NodeKind::Text(t) => assert_eq!(t.text, "first"),
            other => panic!("expected text node, got {:?}", other),
        }
    }
}
