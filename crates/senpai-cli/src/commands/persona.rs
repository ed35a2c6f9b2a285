use anyhow::Result;
use senpai_errors::errors;

use crate::context::CliContext;

pub(crate) fn run_become(ctx: &mut CliContext, words: &[String]) -> Result<()> {
    let persona = words.join(" ");
    if persona.trim().is_empty() {
        return Err(
            errors::usage("Please provide the persona you wish BashSenpai to use.").into_error(),
        );
    }
    ctx.config.main.persona = persona;
    ctx.save_config()?;
    println!("New persona confirmed.");
    Ok(())
}
