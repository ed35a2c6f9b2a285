mod line_editor;
mod loading;
mod menu;
mod stream;
mod terminal;
mod text;

pub use line_editor::{EditKey, EditStatus, LineEditor, LineLayout};
pub use loading::{LOADING_INTERVAL, run_with_indicator};
pub use menu::{CommandMenu, ExecutedCommand, ExitReason, MenuMode, MenuOutcome, MenuState};
pub use stream::{LineKind, ParsedLine, ParsedResponse, StreamFlow, StreamParser, parse};
pub use terminal::{CrosstermTerminal, EditedLine, Key, Terminal};
pub use text::{overflow_rows, separator, truncate_row, visible_width};
