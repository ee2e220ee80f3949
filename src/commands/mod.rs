mod cli;

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Serialize;

use crate::adapters::output_manager::holds_selection;
use crate::adapters::ClipboardOutputManager;
use crate::app::{AppController, Completed, PendingResolve, Resolution};
use crate::domain::{LoadError, ResolveState};
use crate::ports::OutputManager;

pub use cli::{Cli, Commands, ConfigAction};

/// Link resolved (or config command succeeded).
pub const EXIT_OK: i32 = 0;
/// Link failed, or nothing to show.
pub const EXIT_FAILED: i32 = 1;
/// Unexpected error.
pub const EXIT_ERROR: i32 = 2;

/// Run the parsed command line and return the process exit code.
pub async fn dispatch(cli: Cli) -> Result<i32> {
    let controller = AppController::new(cli.startup_options()).context("failed to start droplink")?;

    match cli.command {
        Commands::Link {
            files,
            account_id,
            public_root,
            no_clipboard,
            json,
        } => {
            let file = single_file(files)?;
            let request = LinkCommand {
                account_id,
                public_root,
                no_clipboard,
                json,
            };
            handle_link(&controller, &file, request).await
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => show_config(&controller, json),
            ConfigAction::Path => {
                println!("{}", controller.config_path().display());
                Ok(EXIT_OK)
            }
            ConfigAction::Reset => reset_config(&controller),
        },
    }
}

struct LinkCommand {
    account_id: Option<u64>,
    public_root: Option<PathBuf>,
    no_clipboard: bool,
    json: bool,
}

/// JSON shape of a link result.
#[derive(Serialize)]
struct LinkReport<'a> {
    file: &'a Path,
    #[serde(flatten)]
    state: ResolveState,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    save_warning: Option<String>,
}

/// The single-file guard: linking several files at once is not supported.
fn single_file(mut files: Vec<PathBuf>) -> Result<PathBuf> {
    if files.len() != 1 {
        bail!("select only one file (got {})", files.len());
    }
    let file = files.remove(0);

    if file.is_absolute() {
        Ok(file)
    } else {
        let cwd = std::env::current_dir().context("could not read the working directory")?;
        Ok(cwd.join(file))
    }
}

async fn handle_link(controller: &AppController, file: &Path, request: LinkCommand) -> Result<i32> {
    if !file.is_file() {
        eprintln!("File not found: {}", file.display());
        return Ok(EXIT_FAILED);
    }

    let completed = match controller.service().resolve(file).await {
        Resolution::Complete(done) => done,
        Resolution::NeedsConfig(pending) => {
            collect_config(pending, request.account_id, request.public_root.clone()).await?
        }
    };

    report(completed, &request).await
}

/// Feed the pending request a configuration from the flags or from stdin.
async fn collect_config(
    mut pending: PendingResolve,
    account_id: Option<u64>,
    public_root: Option<PathBuf>,
) -> Result<Completed> {
    let from_flags = account_id.is_some() && public_root.is_some();
    let interactive = io::stdin().is_terminal();

    if !from_flags {
        match pending.reason() {
            LoadError::NotFound { .. } => eprintln!("No configuration yet. Let's set it up."),
            LoadError::Corrupt { path, detail } => {
                eprintln!("Could not use {}: {}", path.display(), detail);
                eprintln!("Please enter your configuration again.");
            }
        }
        if !interactive {
            bail!("configuration required: pass --account-id and --public-root");
        }
    }

    let mut account_id = account_id;
    let mut public_root = public_root;

    loop {
        let id = match account_id.take() {
            Some(id) => id,
            None => prompt_account_id()?,
        };
        let root = match public_root.take() {
            Some(root) => root,
            None => PathBuf::from(prompt("Public folder location: ")?),
        };

        if id.to_string().len() != crate::domain::config::CONVENTIONAL_ACCOUNT_ID_DIGITS {
            eprintln!("Warning: account ids are usually 7 digits, using {} anyway", id);
        }

        match pending.submit_config(id, root).await {
            Ok(done) => return Ok(done),
            Err(rejected) => {
                if !interactive {
                    bail!("invalid configuration: {}", rejected.error);
                }
                eprintln!("Invalid configuration: {}", rejected.error);
                pending = rejected.pending;
            }
        }
    }
}

fn prompt_account_id() -> Result<u64> {
    loop {
        let answer = prompt("Account id: ")?;
        match answer.parse::<u64>() {
            Ok(id) => return Ok(id),
            Err(_) => eprintln!("The account id is a number, try again."),
        }
    }
}

fn prompt(label: &str) -> Result<String> {
    let mut stderr = io::stderr();
    write!(stderr, "{}", label)?;
    stderr.flush()?;

    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        bail!("no input, configuration aborted");
    }
    Ok(line.trim().to_string())
}

async fn report(completed: Completed, request: &LinkCommand) -> Result<i32> {
    let Completed {
        file_path,
        state,
        result,
    } = completed;

    match result {
        Ok(link) => {
            let save_warning = link.save_warning.as_ref().map(|w| w.to_string());

            if request.json {
                let report = LinkReport {
                    file: &file_path,
                    state,
                    url: Some(&link.url),
                    error: None,
                    save_warning: save_warning.clone(),
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{}", link.url);
            }

            if let Some(warning) = save_warning {
                eprintln!("Warning: {}", warning);
            }

            if !request.no_clipboard {
                copy_to_clipboard(&link.url).await;
            }

            Ok(EXIT_OK)
        }
        Err(e) => {
            if request.json {
                let report = LinkReport {
                    file: &file_path,
                    state,
                    url: None,
                    error: Some(e.to_string()),
                    save_warning: None,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                eprintln!("Error: {}", e);
            }
            Ok(EXIT_FAILED)
        }
    }
}

/// Clipboard problems never fail the command; the link is already printed.
async fn copy_to_clipboard(url: &str) {
    let result = match ClipboardOutputManager::new() {
        Ok(output) => {
            if holds_selection() {
                eprintln!("Keeping the link on the clipboard until it is taken over (Ctrl+C to stop)...");
            }
            output.copy_text(url).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => eprintln!("Copied to clipboard."),
        Err(e) => eprintln!("Warning: {}", e),
    }
}

fn show_config(controller: &AppController, json: bool) -> Result<i32> {
    match controller.stored_config() {
        Ok(config) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Account id:    {}", config.account_id());
                println!("Public folder: {}", config.public_folder_root().display());
                println!("Config file:   {}", controller.config_path().display());
                println!("Logs:          {}", controller.logs_dir().display());
                if !config.has_conventional_account_id() {
                    eprintln!("Warning: account ids are usually 7 digits");
                }
            }
            Ok(EXIT_OK)
        }
        Err(LoadError::NotFound { path }) => {
            eprintln!("No configuration stored at {}", path.display());
            Ok(EXIT_FAILED)
        }
        Err(e @ LoadError::Corrupt { .. }) => {
            eprintln!("{}", e);
            Ok(EXIT_FAILED)
        }
    }
}

fn reset_config(controller: &AppController) -> Result<i32> {
    let path = controller.config_path();
    if controller.reset_config()? {
        println!("Removed {}", path.display());
    } else {
        println!("Nothing to remove at {}", path.display());
    }
    Ok(EXIT_OK)
}
