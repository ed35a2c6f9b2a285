use senpai_core::is_newer;
use std::io::{IsTerminal, stdin, stdout};

/// Both ends of the session are a terminal, so raw-mode input is possible.
pub(crate) fn is_interactive() -> bool {
    stdin().is_terminal() && stdout().is_terminal()
}

pub(crate) fn animate_loading() -> bool {
    stdout().is_terminal()
}

pub(crate) fn print_version_notice(latest: Option<&str>, current: &str) {
    if let Some(latest) = latest
        && is_newer(latest, current)
    {
        println!();
        println!("There is a new version available, please consider updating.");
    }
}
