use anyhow::{Result, anyhow};
use senpai_core::EventKind;
use senpai_errors::errors;
use senpai_llm::{LoginOutcome, LoginRejection, SenpaiClient};
use std::io::{BufRead, IsTerminal, Write, stdin, stdout};

use crate::context::CliContext;

const TOKEN_PROMPT: &str = "Auth token: ";

pub(crate) fn run_login(ctx: &mut CliContext) -> Result<()> {
    let token = read_token()?;
    let outcome = ctx.client()?.login(&token)?;
    ctx.observer.record(EventKind::LoginCompletedV1 {
        success: outcome == LoginOutcome::Accepted,
    });

    match outcome {
        LoginOutcome::Accepted => {
            ctx.config.main.token = Some(token);
            ctx.save_config()?;
            println!("Authentication successful.");
            Ok(())
        }
        LoginOutcome::Rejected(rejection) => Err(match rejection {
            LoginRejection::MissingToken => errors::missing_token(),
            LoginRejection::InvalidToken => errors::invalid_token(),
            LoginRejection::NoSubscription => errors::no_subscription(),
            LoginRejection::Other(code) => errors::login_rejected(code),
        }
        .into_error()),
    }
}

/// Reads the token without echo on a terminal, or as one line from piped input.
fn read_token() -> Result<String> {
    if stdin().is_terminal() {
        return Ok(rpassword::prompt_password(TOKEN_PROMPT)?.trim().to_string());
    }
    print!("{TOKEN_PROMPT}");
    stdout().flush()?;
    let mut line = String::new();
    if stdin().lock().read_line(&mut line)? == 0 {
        return Err(anyhow!("no auth token on standard input"));
    }
    println!();
    Ok(line.trim().to_string())
}
