//! Host methods used by the example dialogs.

use rand::Rng;

use ravel_core::types::Value;
use ravel_engine::DialogController;

pub fn register_demo_methods(controller: &mut DialogController) {
    controller.register_method("giveQuest", |args: &[Value]| {
        println!("Added quest {}", first_arg(args));
        None
    });

    controller.register_method("getTiredLevel", |_: &[Value]| {
        let tired_level = rand::thread_rng().gen_range(0..=10);
        println!("Tired Level: {}", tired_level);
        Some(Value::from(tired_level as i64))
    });

    controller.register_method("encounterEnemy", |args: &[Value]| {
        println!("Found an enemy: {}", first_arg(args));
        None
    });
}

fn first_arg(args: &[Value]) -> String {
    args.first().map(|v| v.to_string()).unwrap_or_default()
}
