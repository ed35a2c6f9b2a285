use anyhow::{Result, bail};
use senpai_core::Palette;
use std::io::Write;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::menu::CLEAR_PREVIOUS_LINE;

pub const LOADING_INTERVAL: Duration = Duration::from_millis(550);

const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";
const MESSAGE: &str = "⌛️ Your request is being processed";
const DOT_CYCLE: [usize; 6] = [2, 1, 0, 1, 2, 3];

/// Runs `work` on a scoped thread while animating a loading line on `out`.
///
/// Without `animate` the work runs inline and nothing is printed. The frame
/// is erased and the cursor shown again before returning.
pub fn run_with_indicator<T, F>(
    out: &mut dyn Write,
    palette: &Palette,
    animate: bool,
    work: F,
) -> Result<T>
where
    T: Send,
    F: FnOnce() -> T + Send,
{
    if !animate {
        return Ok(work());
    }

    writeln!(out, "{HIDE_CURSOR}")?;
    out.flush()?;
    let message = palette.comment.paint(MESSAGE);
    let result = thread::scope(|scope| {
        let (tx, rx) = mpsc::channel();
        scope.spawn(move || {
            let _ = tx.send(work());
        });
        animate_until_done(out, &message, &rx)
    });
    write!(out, "{SHOW_CURSOR}")?;
    out.flush()?;
    result
}

fn animate_until_done<T>(
    out: &mut dyn Write,
    message: &str,
    rx: &mpsc::Receiver<T>,
) -> Result<T> {
    for dots in DOT_CYCLE.iter().cycle() {
        writeln!(out, "{message}{}", ".".repeat(*dots))?;
        out.flush()?;
        let received = rx.recv_timeout(LOADING_INTERVAL);
        write!(out, "{CLEAR_PREVIOUS_LINE}")?;
        match received {
            Ok(value) => return Ok(value),
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    bail!("the request worker stopped without a result")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_animation_nothing_is_printed() {
        let mut out = Vec::new();
        let value = run_with_indicator(&mut out, &Palette::plain(), false, || 7).expect("run");
        assert_eq!(value, 7);
        assert!(out.is_empty());
    }

    #[test]
    fn quick_work_shows_one_frame_and_restores_cursor() {
        let mut out = Vec::new();
        let value =
            run_with_indicator(&mut out, &Palette::plain(), true, || "done").expect("run");
        assert_eq!(value, "done");
        let printed = String::from_utf8(out).expect("utf8");
        assert!(printed.starts_with(&format!("{HIDE_CURSOR}\n{MESSAGE}..\n")));
        assert!(printed.ends_with(&format!("{CLEAR_PREVIOUS_LINE}{SHOW_CURSOR}")));
    }

    #[test]
    fn slow_work_cycles_the_dots() {
        let mut out = Vec::new();
        run_with_indicator(&mut out, &Palette::plain(), true, || {
            thread::sleep(Duration::from_millis(1300));
        })
        .expect("run");
        let printed = String::from_utf8(out).expect("utf8");
        assert!(printed.contains(&format!("{MESSAGE}..\n")));
        assert!(printed.contains(&format!("{MESSAGE}.\n")));
        assert!(printed.matches(CLEAR_PREVIOUS_LINE).count() >= 2);
    }
}
