use anyhow::Result;
use crossterm::cursor::{MoveToColumn, MoveUp};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{Clear, ClearType, disable_raw_mode, enable_raw_mode};
use crossterm::{queue, terminal};
use std::io::{self, Write};

use crate::line_editor::{EditKey, EditStatus, LineEditor};

const FALLBACK_WIDTH: usize = 80;

/// Keys the command menu reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Enter,
    Space,
    Char(char),
    Interrupt,
    EndOfInput,
    Other,
}

impl Key {
    pub fn from_event(key: KeyEvent) -> Self {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => Key::Interrupt,
            KeyCode::Char('d') if ctrl => Key::EndOfInput,
            _ if ctrl => Key::Other,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Enter => Key::Enter,
            KeyCode::Char(' ') => Key::Space,
            KeyCode::Char(c) => Key::Char(c),
            _ => Key::Other,
        }
    }
}

/// Result of an in-place edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditedLine {
    /// `None` when the edit was abandoned.
    pub text: Option<String>,
    /// Rows below the first that the prompt and text were left on screen.
    pub overflow_rows: usize,
}

/// The interactive surface the command menu draws on.
pub trait Terminal {
    /// Blocks until a key is pressed.
    fn read_key(&mut self) -> Result<Key>;
    /// Reads one line pre-filled with `initial`.
    fn read_line(&mut self, prompt: &str, initial: &str) -> Result<EditedLine>;
    fn width(&self) -> usize;
    fn out(&mut self) -> &mut dyn Write;
}

/// Leaves raw mode when dropped, including on panic.
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

pub struct CrosstermTerminal {
    stdout: io::Stdout,
}

impl Default for CrosstermTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl CrosstermTerminal {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
        }
    }

    fn next_press() -> Result<KeyEvent> {
        loop {
            if let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                return Ok(key);
            }
        }
    }

    fn redraw(
        &mut self,
        editor: &LineEditor,
        prompt: &str,
        cursor_row: &mut usize,
    ) -> Result<()> {
        let width = self.width();
        if *cursor_row > 0 {
            queue!(self.stdout, MoveUp(*cursor_row as u16))?;
        }
        queue!(self.stdout, MoveToColumn(0), Clear(ClearType::FromCursorDown))?;
        write!(self.stdout, "{prompt}{}", editor.text())?;

        let layout = editor.layout(prompt, width);
        if layout.wraps_at_end {
            write!(self.stdout, "\r\n")?;
        }
        let rows_up = layout.end_row - layout.cursor_row;
        if rows_up > 0 {
            queue!(self.stdout, MoveUp(rows_up as u16))?;
        }
        queue!(self.stdout, MoveToColumn(layout.cursor_col as u16))?;
        self.stdout.flush()?;
        *cursor_row = layout.cursor_row;
        Ok(())
    }

    /// Moves below the edited line and returns how many rows it wrapped into.
    fn finish_line(
        &mut self,
        editor: &LineEditor,
        prompt: &str,
        cursor_row: usize,
    ) -> Result<usize> {
        let layout = editor.layout(prompt, self.width());
        let rows_down = layout.end_row.saturating_sub(cursor_row);
        for _ in 0..rows_down {
            write!(self.stdout, "\r\n")?;
        }
        write!(self.stdout, "\r\n")?;
        self.stdout.flush()?;
        Ok(layout.overflow_rows())
    }
}

fn edit_key(key: KeyEvent) -> EditKey {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('a') if ctrl => EditKey::Home,
        KeyCode::Char('e') if ctrl => EditKey::End,
        KeyCode::Char('u') if ctrl => EditKey::KillToStart,
        KeyCode::Char('k') if ctrl => EditKey::KillToEnd,
        KeyCode::Char('c') | KeyCode::Char('d') if ctrl => EditKey::Cancel,
        _ if ctrl => EditKey::Ignore,
        KeyCode::Char(c) => EditKey::Char(c),
        KeyCode::Backspace => EditKey::Backspace,
        KeyCode::Delete => EditKey::Delete,
        KeyCode::Left => EditKey::Left,
        KeyCode::Right => EditKey::Right,
        KeyCode::Home => EditKey::Home,
        KeyCode::End => EditKey::End,
        KeyCode::Enter => EditKey::Submit,
        KeyCode::Esc => EditKey::Cancel,
        _ => EditKey::Ignore,
    }
}

impl Terminal for CrosstermTerminal {
    fn read_key(&mut self) -> Result<Key> {
        let _guard = RawModeGuard::enter()?;
        Ok(Key::from_event(Self::next_press()?))
    }

    fn read_line(&mut self, prompt: &str, initial: &str) -> Result<EditedLine> {
        let _guard = RawModeGuard::enter()?;
        let mut editor = LineEditor::new(initial);
        let mut cursor_row = 0;
        self.redraw(&editor, prompt, &mut cursor_row)?;
        loop {
            let key = edit_key(Self::next_press()?);
            match editor.apply(key) {
                EditStatus::Editing => self.redraw(&editor, prompt, &mut cursor_row)?,
                EditStatus::Submitted(text) => {
                    let overflow_rows = self.finish_line(&editor, prompt, cursor_row)?;
                    return Ok(EditedLine {
                        text: Some(text),
                        overflow_rows,
                    });
                }
                EditStatus::Cancelled => {
                    let overflow_rows = self.finish_line(&editor, prompt, cursor_row)?;
                    return Ok(EditedLine {
                        text: None,
                        overflow_rows,
                    });
                }
            }
        }
    }

    fn width(&self) -> usize {
        match terminal::size() {
            Ok((cols, _)) if cols > 0 => cols as usize,
            _ => FALLBACK_WIDTH,
        }
    }

    fn out(&mut self) -> &mut dyn Write {
        &mut self.stdout
    }
}
