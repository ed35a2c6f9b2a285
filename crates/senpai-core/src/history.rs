use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Number of question/answer pairs kept on disk.
pub const MAX_HISTORY: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub question: String,
    pub answer: String,
    pub persona: Option<String>,
}

// Older releases stored answers as lists of typed lines.
#[derive(Deserialize)]
struct StoredEntry {
    question: String,
    answer: StoredText,
    #[serde(default)]
    persona: Option<StoredText>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredText {
    Text(String),
    Lines(Vec<StoredLine>),
}

#[derive(Deserialize)]
struct StoredLine {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: String,
}

impl StoredText {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Lines(lines) => {
                let mut out = String::new();
                for line in lines {
                    let marker = match line.kind.as_str() {
                        "comment" => "# ",
                        "command" => "$ ",
                        _ => continue,
                    };
                    out.push_str(marker);
                    out.push_str(&line.data);
                    out.push('\n');
                }
                out.trim().to_string()
            }
        }
    }
}

impl From<StoredEntry> for HistoryEntry {
    fn from(stored: StoredEntry) -> Self {
        Self {
            question: stored.question,
            answer: stored.answer.into_text(),
            persona: stored
                .persona
                .map(StoredText::into_text)
                .filter(|text| !text.is_empty()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct History {
    path: PathBuf,
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join("history.json")
    }

    pub fn empty(dir: &Path) -> Self {
        Self {
            path: Self::path_in(dir),
            entries: Vec::new(),
        }
    }

    pub fn load(dir: &Path) -> Result<Self> {
        let path = Self::path_in(dir);
        if !path.exists() {
            return Ok(Self::empty(dir));
        }
        let raw = fs::read_to_string(&path)?;
        let stored: Vec<StoredEntry> = serde_json::from_str(&raw)
            .map_err(|err| anyhow::anyhow!("invalid history file {}: {err}", path.display()))?;
        Ok(Self {
            path,
            entries: stored.into_iter().map(HistoryEntry::from).collect(),
        })
    }

    pub fn add(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persists only the most recent `MAX_HISTORY` entries.
    pub fn write(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let start = self.entries.len().saturating_sub(MAX_HISTORY);
        fs::write(&self.path, serde_json::to_vec(&self.entries[start..])?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry {
            question: format!("q{n}"),
            answer: format!("a{n}"),
            persona: None,
        }
    }

    #[test]
    fn write_keeps_only_latest_entries() {
        let dir = TempDir::new().expect("tempdir");
        let mut history = History::load(dir.path()).expect("load");
        for n in 0..8 {
            history.add(entry(n));
        }
        history.write().expect("write");

        let reloaded = History::load(dir.path()).expect("reload");
        let questions = reloaded
            .entries()
            .iter()
            .map(|e| e.question.as_str())
            .collect::<Vec<_>>();
        assert_eq!(questions, vec!["q3", "q4", "q5", "q6", "q7"]);
    }

    #[test]
    fn clear_then_write_empties_the_file() {
        let dir = TempDir::new().expect("tempdir");
        let mut history = History::empty(dir.path());
        history.add(entry(1));
        history.write().expect("write");
        history.clear();
        history.write().expect("write");
        let raw = fs::read_to_string(History::path_in(dir.path())).expect("read");
        assert_eq!(raw, "[]");
    }

    #[test]
    fn legacy_line_lists_are_converted() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(
            History::path_in(dir.path()),
            r#"[{"question":"list files","answer":[{"type":"comment","data":"List them"},{"type":"command","data":"ls -la"}],"persona":[]}]"#,
        )
        .expect("write legacy");
        let history = History::load(dir.path()).expect("load");
        assert_eq!(
            history.entries(),
            &[HistoryEntry {
                question: "list files".to_string(),
                answer: "# List them\n$ ls -la".to_string(),
                persona: None,
            }]
        );
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(History::path_in(dir.path()), "{not json").expect("write");
        assert!(History::load(dir.path()).is_err());
    }
}
