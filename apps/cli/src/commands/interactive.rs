//! Interactive session: one line in, one action out.
//!
//! The session keeps an input buffer that starts out holding the placeholder
//! prompt, exactly like an untouched input box. `run` submits the buffer to
//! the selected (or named) model.

use anyhow::Result;
use colored::Colorize;
use lumen_core::{ERROR_TITLE, LumenConfig, OutputSurface, PLACEHOLDER_PROMPT, Workbench};
use std::io::{BufRead, Write};
use std::process::ExitCode;
use tracing::debug;

use super::models;
use crate::terminal::TerminalSurface;

const HELP: &str = "\
Commands:
  models             list registered models
  select <name>      select a model (e.g. select Text Generation)
  info               show information about the selected model
  load               load the selected model
  load all           load every model
  input <text>       set the input text
  file <path>        use a file path as input
  show               print the current input
  run [name]         run the input through the selected or named model
  clear              clear the output
  help               show this help
  quit               leave the session";

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Models,
    Select(String),
    Info,
    Load,
    LoadAll,
    Input(String),
    File(String),
    Show,
    Run(Option<String>),
    Clear,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Action {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        match (verb.to_lowercase().as_str(), rest) {
            ("", _) => Self::Empty,
            ("models", "") => Self::Models,
            ("select", name) if !name.is_empty() => Self::Select(name.to_string()),
            ("info", "") => Self::Info,
            ("load", "") => Self::Load,
            ("load", "all") => Self::LoadAll,
            ("input", text) => Self::Input(text.to_string()),
            ("file", path) if !path.is_empty() => Self::File(path.to_string()),
            ("show", "") => Self::Show,
            ("run", "") => Self::Run(None),
            ("run", name) => Self::Run(Some(name.to_string())),
            ("clear", "") => Self::Clear,
            ("help" | "?", _) => Self::Help,
            ("quit" | "exit", _) => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

/// Start the interactive session on stdin.
pub async fn execute(config: &LumenConfig) -> Result<ExitCode> {
    let mut workbench = Workbench::from_config(config);
    let mut surface = TerminalSurface::new(config.output.image_dir.clone());

    println!("{}", "Lumen interactive session".bold().cyan());
    println!("Models: {}", workbench.dispatcher().registry().names().join(", "));
    println!("Type 'help' for commands.");
    println!();
    workbench.refresh_info(&mut surface);

    let stdin = std::io::stdin();
    session(&mut workbench, &mut surface, stdin.lock()).await?;
    Ok(ExitCode::SUCCESS)
}

async fn session<R: BufRead>(
    workbench: &mut Workbench,
    surface: &mut dyn OutputSurface,
    reader: R,
) -> Result<()> {
    let mut input = PLACEHOLDER_PROMPT.to_string();
    let mut lines = reader.lines();

    loop {
        print!("{} ", "lumen>".cyan().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let action = Action::parse(&line?);
        debug!(action = ?action, "Interactive action");

        match action {
            Action::Models => models::print_registry(workbench.dispatcher().registry(), false)?,
            Action::Select(name) => {
                workbench.select(&name, surface);
            }
            Action::Info => workbench.refresh_info(surface),
            Action::Load => {
                if workbench.load_selected(surface).await.is_none() {
                    surface.notify(ERROR_TITLE, "no model selected");
                }
            }
            Action::LoadAll => {
                workbench.load_all(surface).await;
            }
            Action::Input(text) => input = text,
            Action::File(path) => {
                println!("{} {path}", "Selected file:".dimmed());
                input = path;
            }
            Action::Show => println!("{input}"),
            Action::Run(None) => {
                workbench.run_selected(&input, surface).await;
            }
            Action::Run(Some(name)) => {
                workbench.run(&name, &input, surface).await;
            }
            Action::Clear => workbench.clear(surface),
            Action::Help => println!("{HELP}"),
            Action::Quit => break,
            Action::Empty => {}
            Action::Unknown(line) => {
                surface.notify(ERROR_TITLE, &format!("unknown command '{line}', type 'help' for commands"));
            }
        }
    }

    Ok(())
}
