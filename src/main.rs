mod demo;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use ravel_core::config::AppConfig;
use ravel_core::event::EventBus;
use ravel_core::graph::NodeKind;
use ravel_core::loader::{list_dialogs, load_dialog};
use ravel_core::types::RunEvent;
use ravel_engine::{register_shop_handler, ConsoleIo, DialogController};

#[derive(Parser)]
#[command(name = "ravel", version, about = "Branching dialog graph runner")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "ravel.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a dialog on the console
    Run {
        /// Dialog name (file stem under the category directory)
        name: String,
        /// Dialog category (defaults to the configured category)
        #[arg(long)]
        category: Option<String>,
    },
    /// List the dialogs in a category
    List {
        #[arg(long)]
        category: Option<String>,
    },
    /// Print a one-line summary of every node in a dialog
    Show {
        name: String,
        #[arg(long)]
        category: Option<String>,
    },
    /// Show current configuration
    Config,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout belongs to the dialog
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ravel=info,warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Handle completions before config loading
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "ravel", &mut std::io::stdout());
        return Ok(());
    }

    // An explicitly named config must exist; the default path is optional
    let config = if cli.config == *"ravel.toml" {
        AppConfig::load_or_default(&cli.config)?
    } else {
        AppConfig::load(&cli.config)?
    };
    let root = config.dialogs_dir();
    let category_or_default =
        |category: &Option<String>| category.clone().unwrap_or_else(|| config.dialogs.default_category.clone());

    match &cli.command {
        Commands::Run { name, category } => {
            let category = category_or_default(category);
            let dialog = load_dialog(&root, name, &category).await?;
            info!(dialog = %name, category = %category, nodes = dialog.len(), "Loaded dialog");

            let cancel = tokio_util::sync::CancellationToken::new();
            let cancel_clone = cancel.clone();

            // Ctrl-C interrupts the run at its next input or delay wait
            tokio::spawn(async move {
                tokio::signal::ctrl_c().await.ok();
                info!("Interrupting dialog...");
                cancel_clone.cancel();
            });

            let event_bus = Arc::new(EventBus::new(config.engine.event_capacity));
            let mut events = event_bus.subscribe();
            tokio::spawn(async move {
                while let Ok(event) = events.recv().await {
                    match event {
                        RunEvent::NodeEntered { node_id, node_type, .. } => {
                            debug!(node_id, node_type = %node_type, "Node entered");
                        }
                        RunEvent::MethodInvoked { method, .. } => {
                            debug!(method = %method, "Method invoked");
                        }
                        _ => {}
                    }
                }
            });

            let mut controller = DialogController::new(dialog, Arc::new(ConsoleIo::new()))
                .with_config(config.engine.clone())
                .with_event_bus(event_bus)
                .with_cancellation(cancel);
            register_shop_handler(&mut controller, config.shop.clone())?;
            demo::register_demo_methods(&mut controller);

            match controller.start().await {
                Ok(outcome) => {
                    info!(
                        run_id = %outcome.run_id,
                        steps = outcome.steps,
                        elapsed_ms = outcome.elapsed_ms,
                        "Dialog finished"
                    );
                }
                Err(e) => {
                    error!(error = %e, "Dialog aborted");
                    return Err(e.into());
                }
            }
        }
        Commands::List { category } => {
            let category = category_or_default(category);
            for name in list_dialogs(&root, &category).await? {
                println!("{}", name);
            }
        }
        Commands::Show { name, category } => {
            let category = category_or_default(category);
            let dialog = load_dialog(&root, name, &category).await?;
            for node in dialog.nodes() {
                println!("{:>5}  {:<15} {}", node.id, node.type_tag(), describe(&node.kind));
            }
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
        Commands::Completions { .. } => unreachable!("handled before config load"),
    }

    Ok(())
}

/// Short human-readable summary of a node's outgoing edges.
fn describe(kind: &NodeKind) -> String {
    match kind {
        NodeKind::Start(n) => format!("-> {}", n.next),
        NodeKind::End(_) => "(end)".to_string(),
        NodeKind::Text(n) => format!("{:?} -> {}", n.text, n.next),
        NodeKind::Choice(n) => {
            let options: Vec<String> = n
                .choices
                .iter()
                .map(|c| format!("{:?} -> {}", c.text, c.next))
                .collect();
            format!("{:?} [{}]", n.prompt, options.join(", "))
        }
        NodeKind::If(n) => format!(
            "{} ? {} : {}",
            n.condition.operator, n.true_branch, n.false_branch
        ),
        NodeKind::Function(n) => match n.next {
            Some(next) => format!("{}() : {} -> {}", n.method_name, n.return_type, next),
            None => format!("{}() : {}", n.method_name, n.return_type),
        },
        NodeKind::Delay(n) => format!("wait {} -> {}", n.length, n.next),
        NodeKind::RandomSelector(n) => format!("random {:?}", n.branches),
        NodeKind::Switch(n) => {
            let cases: Vec<String> = n.cases.iter().map(|c| c.next.to_string()).collect();
            format!("cases [{}] default {}", cases.join(", "), n.default_case)
        }
        NodeKind::Custom(c) => match c.body.get("next") {
            Some(next) => format!("-> {}", next),
            None => String::new(),
        },
    }
}
