//! Interactive menu over the commands extracted from an answer.

use anyhow::Result;
use senpai_core::Palette;
use senpai_tools::{ShellRunResult, ShellRunner};
use std::io::Write;

use crate::terminal::{EditedLine, Key, Terminal};
use crate::text::{overflow_rows, separator, truncate_row, visible_width};

/// Moves to the previous row and erases it.
pub(crate) const CLEAR_PREVIOUS_LINE: &str = "\x1b[1A\x1b[2K\r";

const RUN_PROMPT: &str = "🚀 Run: ";
const EDIT_PROMPT: &str = "📝 Edit: ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    pub commands: Vec<String>,
    pub selected_index: usize,
    pub terminal_width: usize,
    /// Rows the last prompt wrapped into beyond its first.
    pub pending_overflow_lines: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuMode {
    Browsing,
    Editing,
    Executing,
    Exited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    Interrupted,
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutedCommand {
    pub command: String,
    pub result: ShellRunResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOutcome {
    pub executed: Vec<ExecutedCommand>,
    pub remaining: Vec<String>,
    pub reason: ExitReason,
}

pub struct CommandMenu<'a> {
    state: MenuState,
    mode: MenuMode,
    palette: &'a Palette,
    terminal: &'a mut dyn Terminal,
    runner: &'a dyn ShellRunner,
    executed: Vec<ExecutedCommand>,
}

impl<'a> CommandMenu<'a> {
    pub fn new(
        commands: Vec<String>,
        palette: &'a Palette,
        terminal: &'a mut dyn Terminal,
        runner: &'a dyn ShellRunner,
    ) -> Self {
        let terminal_width = terminal.width();
        Self {
            state: MenuState {
                commands,
                selected_index: 0,
                terminal_width,
                pending_overflow_lines: 0,
            },
            mode: MenuMode::Browsing,
            palette,
            terminal,
            runner,
            executed: Vec::new(),
        }
    }

    pub fn state(&self) -> &MenuState {
        &self.state
    }

    pub fn mode(&self) -> MenuMode {
        self.mode
    }

    /// Runs the key loop until the user leaves or no commands remain.
    pub fn run(&mut self) -> Result<MenuOutcome> {
        let reason = self.key_loop()?;
        self.mode = MenuMode::Exited;
        Ok(MenuOutcome {
            executed: std::mem::take(&mut self.executed),
            remaining: self.state.commands.clone(),
            reason,
        })
    }

    fn key_loop(&mut self) -> Result<ExitReason> {
        if self.state.commands.is_empty() {
            return Ok(ExitReason::Exhausted);
        }
        self.print_header()?;
        loop {
            self.render()?;
            match self.terminal.read_key()? {
                Key::Up | Key::Char('k' | 'K') => {
                    self.state.selected_index = self.state.selected_index.saturating_sub(1);
                }
                Key::Down | Key::Char('j' | 'J') => {
                    if self.state.selected_index + 1 < self.state.commands.len() {
                        self.state.selected_index += 1;
                    }
                }
                Key::Char('e' | 'E') => self.edit_selected()?,
                Key::Enter | Key::Space => {
                    self.execute_selected()?;
                    if self.state.commands.is_empty() {
                        return Ok(ExitReason::Exhausted);
                    }
                    self.print_header()?;
                }
                Key::Char('q' | 'Q') | Key::EndOfInput => return Ok(ExitReason::Quit),
                Key::Interrupt => return Ok(ExitReason::Interrupted),
                _ => {}
            }
        }
    }

    fn print_header(&mut self) -> Result<()> {
        self.state.terminal_width = self.terminal.width().max(1);
        let command = &self.palette.command;
        let comment = &self.palette.comment;
        let line = comment.paint(&separator(self.state.terminal_width));
        let help = [
            command.paint("💬 "),
            comment.paint("Press "),
            command.paint("[Enter]"),
            comment.paint(" to execute, "),
            command.paint("[E]"),
            comment.paint(" to edit, or "),
            command.paint("[Q]"),
            comment.paint(" to exit."),
        ]
        .concat();
        let reserved = "\n".repeat(self.state.commands.len() + 2);

        let out = self.terminal.out();
        write!(out, "{line}\n{help}\n{line}\n{reserved}")?;
        out.flush()?;
        self.state.pending_overflow_lines = 0;
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        self.mode = MenuMode::Browsing;
        let width = self.terminal.width().max(1);
        self.state.terminal_width = width;

        let rows = self.state.commands.len() + 2 + self.state.pending_overflow_lines;
        let mut frame = CLEAR_PREVIOUS_LINE.repeat(rows);
        for (index, command) in self.state.commands.iter().enumerate() {
            let row = truncate_row(command, width);
            if index == self.state.selected_index {
                frame.push_str(&self.palette.command.paint(&format!("👉 {row}")));
            } else {
                frame.push_str(&self.palette.comment.paint(&format!("   {row}")));
            }
            frame.push('\n');
        }
        frame.push_str(&self.palette.comment.paint(&separator(width)));
        frame.push('\n');

        let selected = &self.state.commands[self.state.selected_index];
        frame.push_str(&self.palette.command.paint(RUN_PROMPT));
        frame.push_str(&self.palette.comment.paint(selected));
        frame.push('\n');
        self.state.pending_overflow_lines =
            overflow_rows(visible_width(RUN_PROMPT) + visible_width(selected), width);

        let out = self.terminal.out();
        out.write_all(frame.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    fn edit_selected(&mut self) -> Result<()> {
        self.mode = MenuMode::Editing;
        let clear = CLEAR_PREVIOUS_LINE.repeat(1 + self.state.pending_overflow_lines);
        let out = self.terminal.out();
        out.write_all(clear.as_bytes())?;
        out.flush()?;

        let index = self.state.selected_index;
        let prompt = self.palette.command.paint(EDIT_PROMPT);
        let EditedLine {
            text,
            overflow_rows: rows,
        } = self.terminal.read_line(&prompt, &self.state.commands[index])?;
        if let Some(edited) = text {
            self.state.commands[index] = edited;
        }
        self.state.pending_overflow_lines = rows;
        Ok(())
    }

    fn execute_selected(&mut self) -> Result<()> {
        self.mode = MenuMode::Executing;
        let command = self.state.commands.remove(self.state.selected_index);

        let out = self.terminal.out();
        writeln!(out)?;
        out.flush()?;
        let result = self.runner.run(&command).unwrap_or_else(|err| ShellRunResult {
            status: None,
            stdout: String::new(),
            stderr: format!("{err:#}"),
        });
        let out = self.terminal.out();
        if let Some(text) = result.display_text() {
            writeln!(out, "{text}")?;
        }
        out.flush()?;

        self.executed.push(ExecutedCommand { command, result });
        if self.state.selected_index > 0 {
            self.state.selected_index -= 1;
        }
        Ok(())
    }
}
