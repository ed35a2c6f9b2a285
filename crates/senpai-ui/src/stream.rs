//! Incremental parser for streamed answers.
//!
//! Text arrives in arbitrary deltas. Each character is fed through a small
//! line state machine, so the printed output, the extracted commands and the
//! transcript do not depend on where the deltas were split.

use senpai_core::{ContentFragment, ErrorKind, ErrorReport, Palette};
use std::io::Write;

const COMMAND_MARKER: char = '$';
/// Starts an annotation line. Annotations render verbatim in the comment color
/// and never reach the command list, even though the legacy client typed them
/// as commands. Whether `>` lines should be runnable is unresolved; only
/// `$` lines are offered in the menu.
const ANNOTATION_MARKER: char = '>';
const COMMENT_MARKER: char = '#';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Command,
    Comment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub kind: LineKind,
    /// Line content without its marker and the whitespace that followed it.
    pub raw_text: String,
    /// Text after ` # ` on a command line.
    pub inline_comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedResponse {
    /// Text to record in the history.
    pub display_text: String,
    /// The persona-styled transcript, when the server also sent the plain answer.
    pub persona_text: Option<String>,
    pub commands: Vec<String>,
    pub lines: Vec<ParsedLine>,
    pub latest_version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFlow {
    Continue,
    Stop,
}

#[derive(Debug, Default)]
struct LineState {
    kind: Option<LineKind>,
    /// Still skipping whitespace that follows a marker.
    skipping_leading: bool,
    text: String,
    /// Command-line characters held back while they may start ` # `.
    held: String,
    inline_comment: Option<String>,
}

pub struct StreamParser<'a, W: Write> {
    out: &'a mut W,
    palette: &'a Palette,
    printed_response: String,
    original_response: Option<String>,
    latest_version: Option<String>,
    line: LineState,
    previous_kind: Option<LineKind>,
    commands: Vec<String>,
    lines: Vec<ParsedLine>,
    pending_output: String,
}

impl<'a, W: Write> StreamParser<'a, W> {
    pub fn new(out: &'a mut W, palette: &'a Palette) -> Self {
        Self {
            out,
            palette,
            printed_response: String::new(),
            original_response: None,
            latest_version: None,
            line: LineState::default(),
            previous_kind: None,
            commands: Vec::new(),
            lines: Vec::new(),
            pending_output: String::new(),
        }
    }

    /// Processes one fragment. An error fragment is returned as the error.
    pub fn feed(&mut self, fragment: ContentFragment) -> Result<StreamFlow, ErrorReport> {
        match fragment {
            ContentFragment::Error(report) => {
                self.abandon_line()?;
                Err(report)
            }
            ContentFragment::Version {
                latest_version,
                original_response,
            } => {
                self.latest_version = Some(latest_version);
                if original_response.is_some() {
                    self.original_response = original_response;
                }
                Ok(StreamFlow::Continue)
            }
            ContentFragment::End => Ok(StreamFlow::Stop),
            ContentFragment::Text(delta) => {
                self.printed_response.push_str(&delta);
                for c in delta.chars() {
                    self.push_char(c);
                }
                self.flush_output()?;
                Ok(StreamFlow::Continue)
            }
        }
    }

    /// Terminates the line in progress and prints the closing blank line.
    pub fn finish(mut self) -> Result<ParsedResponse, ErrorReport> {
        self.end_line();
        self.pending_output.push('\n');
        self.flush_output()?;

        let (display_text, persona_text) = match self.original_response {
            Some(original) => (original, Some(self.printed_response)),
            None => (self.printed_response, None),
        };
        Ok(ParsedResponse {
            display_text,
            persona_text,
            commands: self.commands,
            lines: self.lines,
            latest_version: self.latest_version,
        })
    }

    fn push_char(&mut self, c: char) {
        match c {
            '\r' => {}
            '\n' => self.end_line(),
            _ => match self.line.kind {
                None => self.start_line(c),
                Some(LineKind::Command) => self.push_command_char(c),
                Some(LineKind::Comment) => self.push_comment_char(c),
            },
        }
    }

    fn start_line(&mut self, c: char) {
        if c.is_whitespace() {
            return;
        }
        match c {
            COMMAND_MARKER => {
                self.line.kind = Some(LineKind::Command);
                self.line.skipping_leading = true;
                self.pending_output.push_str(self.palette.command.start());
            }
            ANNOTATION_MARKER => {
                self.line.kind = Some(LineKind::Comment);
                self.line.skipping_leading = true;
                self.pending_output.push_str(self.palette.comment.start());
                self.pending_output.push(c);
            }
            _ => {
                if self.previous_kind == Some(LineKind::Command) {
                    self.pending_output.push('\n');
                }
                self.line.kind = Some(LineKind::Comment);
                self.pending_output.push_str(self.palette.comment.start());
                if c == COMMENT_MARKER {
                    self.line.skipping_leading = true;
                    self.pending_output.push(c);
                } else {
                    self.push_comment_char(c);
                }
            }
        }
    }

    fn push_comment_char(&mut self, c: char) {
        self.pending_output.push(c);
        if self.line.skipping_leading && c.is_whitespace() {
            return;
        }
        self.line.skipping_leading = false;
        self.line.text.push(c);
    }

    fn push_command_char(&mut self, c: char) {
        if let Some(comment) = self.line.inline_comment.as_mut() {
            comment.push(c);
            self.pending_output.push(c);
            return;
        }
        if self.line.skipping_leading {
            if c.is_whitespace() {
                return;
            }
            self.line.skipping_leading = false;
        }

        match (self.line.held.as_str(), c) {
            (" #", ' ') => {
                self.line.held.clear();
                self.line.inline_comment = Some(String::new());
                self.pending_output.push_str(self.palette.comment.start());
                self.pending_output.push_str(" # ");
            }
            (" ", '#') => self.line.held.push(c),
            (_, ' ') => {
                self.release_held();
                self.line.held.push(c);
            }
            _ => {
                self.release_held();
                self.line.text.push(c);
                self.pending_output.push(c);
            }
        }
    }

    fn release_held(&mut self) {
        if self.line.held.is_empty() {
            return;
        }
        let held = std::mem::take(&mut self.line.held);
        self.line.text.push_str(&held);
        self.pending_output.push_str(&held);
    }

    fn end_line(&mut self) {
        let Some(kind) = self.line.kind else {
            self.line = LineState::default();
            return;
        };
        self.release_held();
        self.pending_output.push_str(self.palette.reset());
        self.pending_output.push('\n');

        let line = std::mem::take(&mut self.line);
        let inline_comment = line
            .inline_comment
            .map(|comment| comment.trim().to_string())
            .filter(|comment| !comment.is_empty());
        if kind == LineKind::Command {
            let command = line.text.trim();
            if !command.is_empty() {
                self.commands.push(command.to_string());
            }
        }
        self.lines.push(ParsedLine {
            kind,
            raw_text: line.text.trim_end().to_string(),
            inline_comment,
        });
        self.previous_kind = Some(kind);
    }

    fn abandon_line(&mut self) -> Result<(), ErrorReport> {
        if self.line.kind.is_some() {
            self.pending_output.push_str(self.palette.reset());
            self.pending_output.push('\n');
        }
        self.line = LineState::default();
        self.flush_output()
    }

    fn flush_output(&mut self) -> Result<(), ErrorReport> {
        if self.pending_output.is_empty() {
            return Ok(());
        }
        let chunk = std::mem::take(&mut self.pending_output);
        self.out
            .write_all(chunk.as_bytes())
            .and_then(|()| self.out.flush())
            .map_err(|err| {
                ErrorReport::new(
                    ErrorKind::Unknown,
                    format!("Failed to write the answer to the terminal: {err}"),
                )
            })
    }
}

/// Prints a streamed answer as it arrives and collects its commands.
///
/// Stops at the first `End` fragment; an exhausted stream counts as ended.
pub fn parse<I, W>(
    fragments: I,
    out: &mut W,
    palette: &Palette,
) -> Result<ParsedResponse, ErrorReport>
where
    I: IntoIterator<Item = Result<ContentFragment, ErrorReport>>,
    W: Write,
{
    let mut parser = StreamParser::new(out, palette);
    for fragment in fragments {
        let fragment = match fragment {
            Ok(fragment) => fragment,
            Err(report) => {
                parser.abandon_line()?;
                return Err(report);
            }
        };
        if parser.feed(fragment)? == StreamFlow::Stop {
            break;
        }
    }
    parser.finish()
}
