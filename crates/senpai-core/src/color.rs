//! ANSI color templates built from human color names such as `bold bright blue`.

use crate::config::MainConfig;

pub const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[;1m";

/// Color names with their normal and bright SGR codes.
const COLORS: &[(&str, u8, u8)] = &[
    ("black", 30, 30),
    ("white", 97, 97),
    ("gray", 90, 37),
    ("red", 31, 91),
    ("green", 32, 92),
    ("yellow", 33, 93),
    ("blue", 34, 94),
    ("magenta", 35, 95),
    ("cyan", 36, 96),
];

const MODIFIERS: &[&str] = &["bold", "bright"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("Can't parse \"{0}\"")]
    UnknownWord(String),
    #[error("No color name in \"{0}\"")]
    MissingColor(String),
}

/// Joins, lowercases and validates the words of a color spec.
pub fn normalize_color_spec<S: AsRef<str>>(words: &[S]) -> Result<String, ColorError> {
    let joined = words
        .iter()
        .map(|w| w.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .replace("grey", "gray");
    let mut has_color = false;
    for word in joined.split_whitespace() {
        if COLORS.iter().any(|(name, _, _)| *name == word) {
            has_color = true;
        } else if !MODIFIERS.contains(&word) {
            return Err(ColorError::UnknownWord(word.to_string()));
        }
    }
    if !has_color {
        return Err(ColorError::MissingColor(joined));
    }
    Ok(joined.split_whitespace().collect::<Vec<_>>().join(" "))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTemplate {
    prefix: String,
    reset: String,
}

impl ColorTemplate {
    pub fn parse(spec: &str) -> Result<Self, ColorError> {
        let normalized = normalize_color_spec(&spec.split_whitespace().collect::<Vec<_>>())?;
        let words = normalized.split_whitespace().collect::<Vec<_>>();
        let bright = words.contains(&"bright");
        let bold = words.contains(&"bold");
        let (_, normal, light) = COLORS
            .iter()
            .find(|(name, _, _)| words.contains(name))
            .ok_or_else(|| ColorError::MissingColor(normalized.clone()))?;
        let code = if bright { light } else { normal };
        let mut prefix = String::new();
        if bold {
            prefix.push_str(BOLD);
        }
        prefix.push_str(&format!("\x1b[{code}m"));
        Ok(Self {
            prefix,
            reset: RESET.to_string(),
        })
    }

    /// A template that emits no escape codes at all.
    pub fn plain() -> Self {
        Self {
            prefix: String::new(),
            reset: String::new(),
        }
    }

    pub fn start(&self) -> &str {
        &self.prefix
    }

    pub fn reset(&self) -> &str {
        &self.reset
    }

    pub fn paint(&self, text: &str) -> String {
        format!("{}{}{}", self.prefix, text, self.reset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    pub command: ColorTemplate,
    pub comment: ColorTemplate,
}

impl Palette {
    pub fn from_config(main: &MainConfig) -> Result<Self, ColorError> {
        Ok(Self {
            command: ColorTemplate::parse(&main.command_color)?,
            comment: ColorTemplate::parse(&main.comment_color)?,
        })
    }

    pub fn plain() -> Self {
        Self {
            command: ColorTemplate::plain(),
            comment: ColorTemplate::plain(),
        }
    }

    /// Escape sequence that ends a colored region.
    pub fn reset(&self) -> &str {
        self.command.reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bold_bright_blue_uses_bright_code_with_bold_prefix() {
        let template = ColorTemplate::parse("bold bright blue").expect("parse");
        assert_eq!(template.paint("x"), "\x1b[;1m\x1b[94mx\x1b[0m");
    }

    #[test]
    fn bright_gray_maps_to_light_gray() {
        let template = ColorTemplate::parse("bright gray").expect("parse");
        assert_eq!(template.start(), "\x1b[37m");
        assert_eq!(ColorTemplate::parse("gray").expect("parse").start(), "\x1b[90m");
    }

    #[test]
    fn normalization_accepts_grey_and_mixed_case() {
        let spec = normalize_color_spec(&["Bold", "GREY"]).expect("normalize");
        assert_eq!(spec, "bold gray");
    }

    #[test]
    fn unknown_word_is_rejected() {
        assert_eq!(
            normalize_color_spec(&["bright", "purple"]),
            Err(ColorError::UnknownWord("purple".to_string()))
        );
    }

    #[test]
    fn modifiers_without_color_are_rejected() {
        assert!(matches!(
            normalize_color_spec(&["bold"]),
            Err(ColorError::MissingColor(_))
        ));
    }

    #[test]
    fn default_config_palette_parses() {
        let palette = Palette::from_config(&MainConfig::default()).expect("palette");
        assert_eq!(palette.reset(), RESET);
        assert_eq!(palette.comment.start(), "\x1b[37m");
    }

    #[test]
    fn plain_template_is_transparent() {
        assert_eq!(ColorTemplate::plain().paint("hello"), "hello");
    }
}
