use unicode_width::UnicodeWidthChar;

use crate::text::visible_width;

/// Editing actions understood by [`LineEditor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Char(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    KillToStart,
    KillToEnd,
    Submit,
    Cancel,
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditStatus {
    Editing,
    Submitted(String),
    Cancelled,
}

/// Single-line buffer with a cursor, pre-filled with the text being edited.
#[derive(Debug, Clone, Default)]
pub struct LineEditor {
    chars: Vec<char>,
    cursor: usize,
}

/// Where the edited line ends and where its cursor sits, relative to the
/// row the prompt started on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineLayout {
    pub end_row: usize,
    pub cursor_row: usize,
    pub cursor_col: usize,
    /// The text ends exactly at the right margin and needs an explicit wrap.
    pub wraps_at_end: bool,
}

impl LineLayout {
    /// Rows below the prompt's first that the finished line occupies. An exact
    /// fit counts the row the explicit wrap moved the cursor onto.
    pub fn overflow_rows(&self) -> usize {
        self.end_row
    }
}

impl LineEditor {
    pub fn new(initial: &str) -> Self {
        let chars = initial.chars().collect::<Vec<_>>();
        let cursor = chars.len();
        Self { chars, cursor }
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn apply(&mut self, key: EditKey) -> EditStatus {
        match key {
            EditKey::Char(c) if !c.is_control() => {
                self.chars.insert(self.cursor, c);
                self.cursor += 1;
            }
            EditKey::Backspace if self.cursor > 0 => {
                self.cursor -= 1;
                self.chars.remove(self.cursor);
            }
            EditKey::Delete if self.cursor < self.chars.len() => {
                self.chars.remove(self.cursor);
            }
            EditKey::Left => self.cursor = self.cursor.saturating_sub(1),
            EditKey::Right => self.cursor = (self.cursor + 1).min(self.chars.len()),
            EditKey::Home => self.cursor = 0,
            EditKey::End => self.cursor = self.chars.len(),
            EditKey::KillToStart => {
                self.chars.drain(..self.cursor);
                self.cursor = 0;
            }
            EditKey::KillToEnd => self.chars.truncate(self.cursor),
            EditKey::Submit => return EditStatus::Submitted(self.text()),
            EditKey::Cancel => return EditStatus::Cancelled,
            _ => {}
        }
        EditStatus::Editing
    }

    pub fn layout(&self, prompt: &str, width: usize) -> LineLayout {
        let width = width.max(1);
        let prompt_width = visible_width(prompt);
        let text_width = self
            .chars
            .iter()
            .map(|c| c.width().unwrap_or(0))
            .sum::<usize>();
        let before_cursor = self.chars[..self.cursor]
            .iter()
            .map(|c| c.width().unwrap_or(0))
            .sum::<usize>();
        let end_cells = prompt_width + text_width;
        let cursor_cells = prompt_width + before_cursor;
        LineLayout {
            end_row: end_cells / width,
            cursor_row: cursor_cells / width,
            cursor_col: cursor_cells % width,
            wraps_at_end: end_cells > 0 && end_cells % width == 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_keys(editor: &mut LineEditor, keys: &[EditKey]) {
        for key in keys {
            assert_eq!(editor.apply(*key), EditStatus::Editing);
        }
    }

    #[test]
    fn starts_with_cursor_at_end() {
        let editor = LineEditor::new("ls -la");
        assert_eq!(editor.text(), "ls -la");
        assert_eq!(editor.cursor(), 6);
    }

    #[test]
    fn inserts_at_cursor() {
        let mut editor = LineEditor::new("ls -a");
        type_keys(
            &mut editor,
            &[EditKey::Left, EditKey::Char('l')],
        );
        assert_eq!(editor.text(), "ls -la");
    }

    #[test]
    fn deletion_and_kill_keys() {
        let mut editor = LineEditor::new("git status");
        type_keys(&mut editor, &[EditKey::Backspace, EditKey::Home, EditKey::Delete]);
        assert_eq!(editor.text(), "it statu");
        type_keys(&mut editor, &[EditKey::Right, EditKey::Right, EditKey::KillToEnd]);
        assert_eq!(editor.text(), "it");
        type_keys(&mut editor, &[EditKey::KillToStart]);
        assert_eq!(editor.text(), "");
        type_keys(&mut editor, &[EditKey::Backspace, EditKey::Delete, EditKey::Left]);
        assert_eq!(editor.cursor(), 0);
    }

    #[test]
    fn submit_and_cancel_end_editing() {
        let mut editor = LineEditor::new("pwd");
        assert_eq!(
            editor.apply(EditKey::Submit),
            EditStatus::Submitted("pwd".to_string())
        );
        assert_eq!(editor.apply(EditKey::Cancel), EditStatus::Cancelled);
    }

    #[test]
    fn control_characters_are_not_inserted() {
        let mut editor = LineEditor::new("");
        type_keys(&mut editor, &[EditKey::Char('\t'), EditKey::Ignore]);
        assert_eq!(editor.text(), "");
    }

    #[test]
    fn layout_tracks_wrapping() {
        let editor = LineEditor::new("abcdef");
        let layout = editor.layout("> ", 4);
        assert_eq!(
            layout,
            LineLayout {
                end_row: 2,
                cursor_row: 2,
                cursor_col: 0,
                wraps_at_end: true,
            }
        );

        let mut editor = LineEditor::new("abc");
        editor.apply(EditKey::Home);
        let layout = editor.layout("\x1b[94m> \x1b[0m", 10);
        assert_eq!(layout.cursor_col, 2);
        assert_eq!(layout.end_row, 0);
        assert!(!layout.wraps_at_end);
    }

    #[test]
    fn exact_fit_occupies_the_wrapped_row() {
        let editor = LineEditor::new(&"a".repeat(11));
        let layout = editor.layout("📝 Edit: ", 20);
        assert!(layout.wraps_at_end);
        assert_eq!(layout.overflow_rows(), 1);

        let editor = LineEditor::new(&"a".repeat(10));
        assert_eq!(editor.layout("📝 Edit: ", 20).overflow_rows(), 0);
    }
}
