pub(crate) mod ask;
pub(crate) mod explain;
pub(crate) mod login;
pub(crate) mod persona;

use anyhow::Result;
use senpai_core::{ErrorReport, EventKind};
use senpai_llm::ResponseStream;
use senpai_ui::{ParsedResponse, parse, run_with_indicator};
use std::io::stdout;

use crate::context::CliContext;
use crate::output::animate_loading;

/// Sends a request behind the loading indicator, then prints the answer as it streams in.
pub(crate) fn stream_answer<F>(ctx: &CliContext, open: F) -> Result<ParsedResponse>
where
    F: FnOnce() -> std::result::Result<ResponseStream, ErrorReport> + Send,
{
    let palette = ctx.palette()?;
    let mut out = stdout().lock();
    let opened = run_with_indicator(&mut out, &palette, animate_loading(), open)?;
    let parsed = opened.and_then(|stream| parse(stream, &mut out, &palette));
    match parsed {
        Ok(parsed) => {
            ctx.observer.record(EventKind::ResponseParsedV1 {
                commands: parsed.commands.len(),
                latest_version: parsed.latest_version.clone(),
            });
            Ok(parsed)
        }
        Err(report) => {
            ctx.observer.record(EventKind::RequestFailedV1 {
                kind: report.kind,
                message: report.message.clone(),
            });
            Err(report.into())
        }
    }
}
