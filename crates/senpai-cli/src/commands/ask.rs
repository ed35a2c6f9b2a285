use anyhow::Result;
use senpai_core::{EventKind, HistoryEntry, detect_platform};
use senpai_llm::{QuestionRequest, SenpaiClient};
use senpai_tools::PlatformShellRunner;
use senpai_ui::{CommandMenu, CrosstermTerminal};

use crate::commands::stream_answer;
use crate::context::CliContext;
use crate::output::{is_interactive, print_version_notice};

pub(crate) fn run_ask(ctx: &CliContext, question: &str) -> Result<()> {
    let client = ctx.client()?;
    let mut history = ctx.history();
    let metadata = ctx
        .config
        .main
        .metadata
        .then(|| detect_platform().metadata());
    let request = QuestionRequest {
        question: question.to_string(),
        history: history.entries().to_vec(),
        metadata,
    };
    ctx.observer.record(EventKind::QuestionSentV1 {
        question: question.to_string(),
        persona: ctx.config.main.persona.clone(),
        history_len: request.history.len(),
    });

    let parsed = stream_answer(ctx, || client.question(&request))?;

    history.add(HistoryEntry {
        question: question.to_string(),
        answer: parsed.display_text.clone(),
        persona: parsed.persona_text.clone(),
    });
    if let Err(err) = history.write() {
        ctx.observer
            .warn_log(&format!("failed to write {}: {err:#}", history.path().display()));
    }

    if ctx.config.main.execute && !parsed.commands.is_empty() {
        if is_interactive() {
            run_menu(ctx, parsed.commands.clone())?;
        } else {
            ctx.observer
                .verbose_log("not a terminal; skipping the command menu");
        }
    }

    print_version_notice(parsed.latest_version.as_deref(), &ctx.config.main.version);
    Ok(())
}

fn run_menu(ctx: &CliContext, commands: Vec<String>) -> Result<()> {
    let palette = ctx.palette()?;
    let mut terminal = CrosstermTerminal::new();
    let runner = PlatformShellRunner::default();
    let outcome = CommandMenu::new(commands, &palette, &mut terminal, &runner).run()?;
    for executed in &outcome.executed {
        ctx.observer.record(EventKind::CommandExecutedV1 {
            command: executed.command.clone(),
            status: executed.result.status,
        });
    }
    ctx.observer.verbose_log(&format!(
        "menu closed ({:?}) with {} command(s) left",
        outcome.reason,
        outcome.remaining.len()
    ));
    Ok(())
}
