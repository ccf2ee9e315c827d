use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;

use ravel_core::config::{AfterPurchase, ShopConfig};
use ravel_core::error::{RavelError, Result};
use ravel_core::event::EventBus;
use ravel_core::graph::Node;
use ravel_core::types::{NodeId, RunEvent, Value};
use ravel_engine::{handler_fn, register_shop_handler, DialogController, NodeRegistry};
use ravel_test_utils::fixtures::{HELLO_DIALOG, LOOP_DIALOG, TIRED_DIALOG};
use ravel_test_utils::{dialog, recording_method, ScriptedIo};

#[tokio::test]
async fn hello_dialog_displays_waits_and_terminates() {
    let io = ScriptedIo::new(["ok"]);
    let mut ctl = DialogController::new(dialog(HELLO_DIALOG), io.clone());

    let outcome = ctl.start().await.unwrap();

    assert_eq!(outcome.path, vec![0, 1, 2]);
    assert_eq!(io.outputs(), vec!["Dialog: Hello", "Encountered end node"]);
    assert_eq!(io.prompts_seen(), 1);
    assert_eq!(io.remaining(), 0);
}

#[tokio::test]
async fn hello_dialog_without_acknowledgement_fails() {
    let io = ScriptedIo::new(Vec::<String>::new());
    let mut ctl = DialogController::new(dialog(HELLO_DIALOG), io.clone());

    let err = ctl.start().await.unwrap_err();
    assert!(matches!(err, RavelError::NoInput));
    assert_eq!(io.outputs(), vec!["Dialog: Hello"]);
}

#[tokio::test]
async fn function_value_drives_if_branch() {
    let io = ScriptedIo::new(["ok"]);
    let mut ctl = DialogController::new(dialog(TIRED_DIALOG), io.clone());
    let (calls, method) = recording_method(Some(Value::Number(7.0)));
    ctl.register_method("getTiredLevel", method);

    let outcome = ctl.start().await.unwrap();

    assert_eq!(outcome.path, vec![0, 1, 3, 5]);
    assert_eq!(io.outputs()[0], "Dialog: Rest");
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn function_value_takes_false_branch() {
    let io = ScriptedIo::new(["ok"]);
    let mut ctl = DialogController::new(dialog(TIRED_DIALOG), io.clone());
    ctl.register_method("getTiredLevel", |_: &[Value]| Some(Value::Number(2.0)));

    let outcome = ctl.start().await.unwrap();
    assert_eq!(outcome.path, vec![0, 1, 4, 5]);
    assert_eq!(io.outputs()[0], "Dialog: Go");
}

#[tokio::test]
async fn choice_then_quest_and_shop() {
    let json = r#"{"nodes": [
        {"id": 0, "type": "start", "next": 1},
        {"id": 1, "type": "choice", "prompt": "Help the village?",
         "choices": [{"text": "Yes", "next": 2}, {"text": "No", "next": 9}]},
        {"id": 2, "type": "function", "methodName": "giveQuest", "returnType": "void",
         "parameters": [{"value": "Slay the dragon"}], "next": 3},
        {"id": 3, "type": "shop", "next": 9, "items": [
            {"name": "Potion", "description": "Heals", "price": 10}
        ]},
        {"id": 9, "type": "end"}
    ]}"#;
    // Yes, buy a potion (reprompt), then leave
    let io = ScriptedIo::new(["1", "1", "0"]);
    let mut ctl = DialogController::new(dialog(json), io.clone());
    register_shop_handler(&mut ctl, ShopConfig::default()).unwrap();
    let (quests, give_quest) = recording_method(None);
    ctl.register_method("giveQuest", give_quest);

    let outcome = ctl.start().await.unwrap();

    assert_eq!(outcome.path, vec![0, 1, 2, 3, 3, 9]);
    assert_eq!(
        *quests.lock().unwrap(),
        vec![vec![Value::from("Slay the dragon")]]
    );
    assert!(io
        .outputs()
        .contains(&"You have been charged $10".to_string()));
}

#[tokio::test]
async fn shop_next_policy_leaves_after_purchase() {
    let json = r#"{"nodes": [
        {"id": 0, "type": "start", "next": 3},
        {"id": 3, "type": "shop", "next": 9, "items": [
            {"name": "Potion", "description": "Heals", "price": 10}
        ]},
        {"id": 9, "type": "end"}
    ]}"#;
    let io = ScriptedIo::new(["1"]);
    let mut ctl = DialogController::new(dialog(json), io);
    let policy = ShopConfig {
        allow_exit: false,
        after_purchase: AfterPurchase::Next,
        purchase_method: None,
    };
    register_shop_handler(&mut ctl, policy).unwrap();

    let outcome = ctl.start().await.unwrap();
    assert_eq!(outcome.path, vec![0, 3, 9]);
}

#[tokio::test]
async fn shop_without_handler_is_unregistered() {
    let json = r#"{"nodes": [
        {"id": 0, "type": "start", "next": 3},
        {"id": 3, "type": "shop", "next": 9, "items": []},
        {"id": 9, "type": "end"}
    ]}"#;
    let mut ctl = DialogController::new(dialog(json), ScriptedIo::new(["0"]));

    let err = ctl.start().await.unwrap_err();
    assert!(matches!(err, RavelError::UnregisteredNodeType(t) if t == "shop"));
}

fn banner<'a>(node: &'a Node, ctl: &'a DialogController) -> BoxFuture<'a, Result<Option<NodeId>>> {
    Box::pin(async move {
        let title: String = node
            .decode_custom::<serde_json::Value>()?
            .get("title")
            .and_then(|t| t.as_str())
            .unwrap_or_default()
            .to_string();
        ctl.output(&format!("*** {} ***", title));
        Ok(Some(node.id + 1))
    })
}

#[tokio::test]
async fn extension_handler_from_function() {
    let json = r#"{"nodes": [
        {"id": 0, "type": "start", "next": 1},
        {"id": 1, "type": "banner", "title": "Chapter One"},
        {"id": 2, "type": "end"}
    ]}"#;
    let io = ScriptedIo::new(Vec::<String>::new());
    let mut ctl = DialogController::new(dialog(json), io.clone());
    ctl.register_node_handler("banner", handler_fn(banner)).unwrap();

    ctl.start().await.unwrap();
    assert_eq!(io.outputs(), vec!["*** Chapter One ***", "Encountered end node"]);

    let err = ctl.register_node_handler("banner", handler_fn(banner)).unwrap_err();
    assert!(matches!(err, RavelError::DuplicateHandler(_)));
}

fn curtain<'a>(_node: &'a Node, ctl: &'a DialogController) -> BoxFuture<'a, Result<Option<NodeId>>> {
    Box::pin(async move {
        ctl.output("The curtain falls.");
        Ok(None)
    })
}

fn back_to_zero<'a>(_node: &'a Node, _ctl: &'a DialogController) -> BoxFuture<'a, Result<Option<NodeId>>> {
    Box::pin(async move { Ok(Some(0)) })
}

#[tokio::test]
async fn handler_returning_none_ends_run() {
    let json = r#"{"nodes": [
        {"id": 0, "type": "start", "next": 1},
        {"id": 1, "type": "curtain"},
        {"id": 2, "type": "end"}
    ]}"#;
    let io = ScriptedIo::new(Vec::<String>::new());
    let mut ctl = DialogController::new(dialog(json), io.clone());
    ctl.register_node_handler("curtain", handler_fn(curtain)).unwrap();

    let outcome = ctl.start().await.unwrap();
    assert_eq!(outcome.path, vec![0, 1]);
    assert_eq!(outcome.steps, 2);
    assert_eq!(io.outputs(), vec!["The curtain falls.", "Encountered end node"]);
}

#[tokio::test]
async fn handler_returning_zero_ends_run() {
    // Node 0 exists, but an edge to it still terminates
    let json = r#"{"nodes": [
        {"id": 0, "type": "start", "next": 1},
        {"id": 1, "type": "rewind"}
    ]}"#;
    let io = ScriptedIo::new(Vec::<String>::new());
    let mut ctl = DialogController::new(dialog(json), io.clone());
    ctl.register_node_handler("rewind", handler_fn(back_to_zero)).unwrap();

    let outcome = ctl.start().await.unwrap();
    assert_eq!(outcome.path, vec![0, 1]);
    assert_eq!(io.outputs(), vec!["Encountered end node"]);
}

#[tokio::test]
async fn empty_registry_rejects_builtins() {
    let mut ctl = DialogController::new(dialog(HELLO_DIALOG), ScriptedIo::new(["ok"]))
        .with_registry(NodeRegistry::new());

    let err = ctl.start().await.unwrap_err();
    assert!(matches!(err, RavelError::UnregisteredNodeType(t) if t == "start"));
}

#[tokio::test]
async fn failed_run_publishes_event() {
    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();
    let mut ctl = DialogController::new(dialog(TIRED_DIALOG), ScriptedIo::new(["ok"]))
        .with_event_bus(bus.clone());

    let err = ctl.start().await.unwrap_err();
    assert!(matches!(err, RavelError::UnknownMethod(ref m) if m == "getTiredLevel"));

    let mut failed = false;
    while let Ok(event) = rx.try_recv() {
        if let RunEvent::RunFailed { error, .. } = event {
            assert!(error.contains("getTiredLevel"));
            failed = true;
        }
    }
    assert!(failed);
}

#[tokio::test]
async fn method_invocations_are_published() {
    let bus = Arc::new(EventBus::default());
    let mut rx = bus.subscribe();
    let mut ctl = DialogController::new(dialog(TIRED_DIALOG), ScriptedIo::new(["ok"]))
        .with_event_bus(bus.clone());
    ctl.register_method("getTiredLevel", |_: &[Value]| Some(Value::Number(9.0)));

    ctl.start().await.unwrap();

    let mut methods = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let RunEvent::MethodInvoked { method, .. } = event {
            methods.push(method);
        }
    }
    assert_eq!(methods, vec!["getTiredLevel"]);
}

#[tokio::test(start_paused = true)]
async fn cyclic_dialog_never_terminates() {
    let mut ctl = DialogController::new(dialog(LOOP_DIALOG), ScriptedIo::new(Vec::<String>::new()));

    let result = tokio::time::timeout(Duration::from_secs(5), ctl.start()).await;
    assert!(result.is_err(), "a dialog without an end should keep running");
}
