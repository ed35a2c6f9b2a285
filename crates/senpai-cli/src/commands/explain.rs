use anyhow::Result;
use senpai_core::EventKind;
use senpai_llm::SenpaiClient;

use crate::commands::stream_answer;
use crate::context::CliContext;
use crate::output::print_version_notice;

pub(crate) fn run_explain(ctx: &CliContext, command: &str) -> Result<()> {
    let client = ctx.client()?;
    ctx.observer.record(EventKind::ExplainSentV1 {
        command: command.to_string(),
    });
    let parsed = stream_answer(ctx, || client.explain(command))?;
    print_version_notice(parsed.latest_version.as_deref(), &ctx.config.main.version);
    Ok(())
}
