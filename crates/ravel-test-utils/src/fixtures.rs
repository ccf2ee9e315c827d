use ravel_core::graph::Dialog;

/// Parse a dialog document, panicking on malformed fixtures.
pub fn dialog(json: &str) -> Dialog {
    Dialog::from_json_str(json).expect("fixture dialog should parse")
}

/// `start -> text("Hello") -> end`.
pub const HELLO_DIALOG: &str = r#"{"nodes": [
    {"id": 0, "type": "start", "next": 1},
    {"id": 1, "type": "text", "text": "Hello", "next": 2},
    {"id": 2, "type": "end"}
]}"#;

/// An `if` whose left operand comes from the `getTiredLevel` method,
/// compared `> 5`. True goes to text 3 ("Rest"), false to text 4 ("Go").
pub const TIRED_DIALOG: &str = r#"{"nodes": [
    {"id": 0, "type": "start", "next": 1},
    {"id": 1, "type": "if",
     "condition": {"operator": ">", "value1": {"sourceNodeId": 2}, "value2": {"value": 5}},
     "trueBranch": 3, "falseBranch": 4},
    {"id": 2, "type": "function", "methodName": "getTiredLevel", "returnType": "number"},
    {"id": 3, "type": "text", "text": "Rest", "next": 5},
    {"id": 4, "type": "text", "text": "Go", "next": 5},
    {"id": 5, "type": "end"}
]}"#;

/// Two nodes that loop forever without reaching an end.
pub const LOOP_DIALOG: &str = r#"{"nodes": [
    {"id": 0, "type": "start", "next": 1},
    {"id": 1, "type": "delay", "length": 10, "next": 2},
    {"id": 2, "type": "delay", "length": 10, "next": 1}
]}"#;
