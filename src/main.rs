//! # Pozform CLI
//!
//! Command-line simulator for the form engine: load a page snapshot,
//! boot, apply scripted user actions, print the resulting state.
//!
//! ## Usage
//!
//! ```bash
//! # Boot the built-in sample form and print its state
//! pozform demo
//!
//! # Also print the captured event log
//! pozform demo --events
//!
//! # Drive a real page snapshot through a script of user actions
//! pozform run page.json --script actions.json --events
//! ```
//!
//! A script is a JSON array of actions:
//!
//! ```json
//! [
//!   {"action": "toggle", "field": "id_paslauga_ktl", "on": true},
//!   {"action": "click", "node": "kainos-add-row-kainos"},
//!   {"action": "commit", "field": "kainos-0-kaina", "value": "12,5"}
//! ]
//! ```

use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use pozform::{Change, Document, Engine, PozformError, sample};

/// Pozform - order-form state engine simulator
#[derive(Parser, Debug)]
#[command(name = "pozform")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load a form document, apply a script, print the final state
    Run {
        /// Page snapshot (JSON document)
        document: PathBuf,

        /// Script of user actions to apply after boot
        #[arg(long)]
        script: Option<PathBuf>,

        /// Include the captured event log in the output
        #[arg(long)]
        events: bool,
    },
    /// Boot the built-in sample order form
    Demo {
        /// Script of user actions to apply after boot
        #[arg(long)]
        script: Option<PathBuf>,

        /// Include the captured event log in the output
        #[arg(long)]
        events: bool,
    },
}

/// One scripted user action.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ScriptAction {
    /// Programmatic write, no events.
    Set { field: String, value: String },
    /// Type a value (write + input trigger).
    Type { field: String, value: String },
    /// Type a value and leave the field (input + blur).
    Commit { field: String, value: String },
    /// Focus leaves a field.
    Blur { field: String },
    /// Toggle a checkbox.
    Toggle { field: String, on: bool },
    /// Pick a select option.
    Choose { field: String, value: String },
    /// Activate a button.
    Click { node: String },
}

fn apply(engine: &mut Engine, action: ScriptAction) {
    match action {
        ScriptAction::Set { field, value } => {
            engine.set_value(&field, &value);
        }
        ScriptAction::Type { field, value } => engine.type_into(&field, &value),
        ScriptAction::Commit { field, value } => engine.commit(&field, &value),
        ScriptAction::Blur { field } => engine.blur(&field),
        ScriptAction::Toggle { field, on } => {
            engine.toggle(&field, on);
        }
        ScriptAction::Choose { field, value } => engine.choose(&field, &value),
        ScriptAction::Click { node } => engine.click(&node),
    }
}

fn drive(doc: Document, script: Option<PathBuf>, events: bool) -> Result<(), PozformError> {
    let mut engine = Engine::new(doc);

    let log: Rc<RefCell<Vec<Change>>> = Rc::new(RefCell::new(Vec::new()));
    if events {
        let log = Rc::clone(&log);
        engine.subscribe_all(Box::new(move |change| {
            log.borrow_mut().push(change.clone());
            Ok(())
        }));
    }

    engine.boot();

    if let Some(path) = script {
        let actions: Vec<ScriptAction> = serde_json::from_str(&fs::read_to_string(path)?)?;
        for action in actions {
            apply(&mut engine, action);
        }
    }

    if events {
        let output = serde_json::json!({
            "document": engine.doc(),
            "events": &*log.borrow(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", engine.doc().to_json_pretty()?);
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), PozformError> {
    match cli.command {
        Commands::Run {
            document,
            script,
            events,
        } => {
            let doc = Document::from_json(&fs::read_to_string(document)?)?;
            drive(doc, script, events)
        }
        Commands::Demo { script, events } => drive(sample::order_form(), script, events),
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
