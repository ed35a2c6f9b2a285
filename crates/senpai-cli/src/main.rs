use anyhow::Result;
use clap::{ArgAction, Parser};
use senpai_errors::{ErrorHandler, errors};
use std::process::ExitCode;

mod commands;
mod context;
mod output;

use commands::ask::run_ask;
use commands::explain::run_explain;
use commands::login::run_login;
use commands::persona::run_become;
use context::CliContext;

const DEFAULT_PROG: &str = "senpai";

#[derive(Parser, Debug)]
#[command(name = "senpai", version, disable_version_flag = true)]
#[command(about = "Ask BashSenpai about the terminal and run the commands it suggests")]
#[command(after_help = "prompts:
  login                authenticate using your auth token
  explain <command>    show most common use cases for a specific command
  become <persona>     change the persona of BashSenpai, use \"default\" to reset
  <question>           ask anything

examples:
  senpai login
  senpai become angry pirate
  senpai explain tar
  senpai how to create a new git branch")]
struct Cli {
    /// Ignore previous history when sending a question.
    #[arg(short = 'n', long = "new")]
    new: bool,

    /// Set a new color for the commands.
    #[arg(long = "command-color", num_args = 1.., value_name = "COLOR")]
    command_color: Option<Vec<String>>,

    /// Set a new color for the comments.
    #[arg(long = "comment-color", num_args = 1.., value_name = "COLOR")]
    comment_color: Option<Vec<String>>,

    /// Send OS metadata along with questions.
    #[arg(long = "meta", overrides_with = "no_meta")]
    meta: bool,

    /// Stop sending OS metadata.
    #[arg(long = "no-meta", overrides_with = "meta")]
    no_meta: bool,

    /// Offer a menu to run the commands from an answer.
    #[arg(long = "run", overrides_with = "no_run")]
    run: bool,

    /// Never offer the command menu.
    #[arg(long = "no-run", overrides_with = "run")]
    no_run: bool,

    /// Enable verbose logging to stderr.
    #[arg(long = "verbose")]
    verbose: bool,

    /// Show the current version.
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,

    /// Ask a question or use one of the prompts below.
    #[arg(value_name = "PROMPT")]
    prompt: Vec<String>,
}

impl Cli {
    fn metadata(&self) -> Option<bool> {
        toggle(self.meta, self.no_meta)
    }

    fn execute(&self) -> Option<bool> {
        toggle(self.run, self.no_run)
    }

    fn is_empty(&self) -> bool {
        self.prompt.is_empty()
            && !self.new
            && !self.verbose
            && self.command_color.is_none()
            && self.comment_color.is_none()
            && self.metadata().is_none()
            && self.execute().is_none()
    }
}

fn toggle(on: bool, off: bool) -> Option<bool> {
    match (on, off) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

/// Name this binary was invoked as, used in guidance messages.
fn prog_name() -> String {
    std::env::args_os()
        .next()
        .and_then(|arg0| {
            std::path::Path::new(&arg0)
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
        })
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_PROG.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let prog = prog_name();
    match run(&cli, &prog) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let handler = ErrorHandler::new(&prog).verbose(cli.verbose);
            eprint!("{}", handler.handle(&err));
            ExitCode::from(handler.exit_code(&err))
        }
    }
}

fn run(cli: &Cli, prog: &str) -> Result<()> {
    if cli.is_empty() {
        return Err(errors::no_arguments(prog).into_error());
    }

    let mut ctx = CliContext::load(cli.verbose)?;
    ctx.config.main.prog = prog.to_string();
    ctx.config.main.version = env!("CARGO_PKG_VERSION").to_string();
    ctx.apply_colors(cli.command_color.as_deref(), cli.comment_color.as_deref())?;
    if let Some(metadata) = cli.metadata() {
        ctx.config.main.metadata = metadata;
    }
    if let Some(execute) = cli.execute() {
        ctx.config.main.execute = execute;
    }
    ctx.save_config()?;
    if cli.new {
        ctx.clear_history()?;
    }

    let Some((first, rest)) = cli.prompt.split_first() else {
        return Ok(());
    };
    match first.as_str() {
        "login" => {
            if !rest.is_empty() {
                return Err(errors::usage("The \"login\" prompt takes no extra arguments.").into_error());
            }
            run_login(&mut ctx)
        }
        "become" => run_become(&mut ctx, rest),
        "explain" if rest.len() < 2 => {
            let Some(command) = rest.first() else {
                return Err(errors::usage(
                    "The \"explain\" prompt takes one extra argument in the form of a command name.",
                )
                .into_error());
            };
            run_explain(&ctx, command)
        }
        _ => run_ask(&ctx, &cli.prompt.join(" ")),
    }
}
