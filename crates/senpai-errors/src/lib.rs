//! User-facing error messages for senpai.
//!
//! Every failure that reaches `main` is turned into an [`EnhancedError`]: a
//! one-line `Error! ...` message, follow-up guidance, and the process exit
//! status that scripts can branch on.

use anyhow::Error;
use senpai_core::{ColorError, DASHBOARD_URL, ErrorKind, ErrorReport};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Enhanced error with a user-friendly message and follow-up guidance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedError {
    pub title: String,
    pub message: String,
    pub suggestions: Vec<String>,
    pub error_type: ErrorType,
    pub context: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorType {
    /// Missing, invalid or unsubscribed auth token
    Authentication,
    /// Transport failures and server-side faults
    Server,
    /// The server rejected the stored conversation history
    History,
    /// Bad command-line usage or config values
    Usage,
    Unknown,
}

impl ErrorType {
    pub fn emoji(&self) -> &'static str {
        match self {
            ErrorType::Authentication => "🔒",
            ErrorType::Server => "🌐",
            ErrorType::History => "📜",
            ErrorType::Usage => "📋",
            ErrorType::Unknown => "❓",
        }
    }

    /// Process exit status for this category.
    pub fn exit_code(&self) -> u8 {
        match self {
            ErrorType::Usage => 1,
            ErrorType::Authentication => 2,
            ErrorType::Server | ErrorType::History | ErrorType::Unknown => 3,
        }
    }
}

impl From<ErrorKind> for ErrorType {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::Auth => ErrorType::Authentication,
            ErrorKind::Server => ErrorType::Server,
            ErrorKind::History => ErrorType::History,
            ErrorKind::Unknown => ErrorType::Unknown,
        }
    }
}

impl EnhancedError {
    pub fn new(
        title: impl Into<String>,
        message: impl Into<String>,
        error_type: ErrorType,
    ) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            suggestions: Vec::new(),
            error_type,
            context: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn into_error(self) -> Error {
        Error::new(self)
    }

    pub fn exit_code(&self) -> u8 {
        self.error_type.exit_code()
    }

    /// Renders `Error! <message>.` followed by one guidance line per suggestion.
    pub fn format(&self, verbose: bool) -> String {
        let mut output = String::new();

        if verbose {
            output.push_str(&format!("{} {}\n", self.error_type.emoji(), self.title));
        }

        let message = self.message.trim_end();
        if message.ends_with(['.', '!', '?', ':']) {
            output.push_str(&format!("Error! {message}\n"));
        } else {
            output.push_str(&format!("Error! {message}.\n"));
        }

        if verbose && let Some(context) = &self.context {
            output.push_str(&format!("  Context: {context}\n"));
        }

        for suggestion in &self.suggestions {
            output.push_str(&format!("{suggestion}\n"));
        }

        output
    }
}

impl fmt::Display for EnhancedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EnhancedError {}

/// Turns arbitrary errors into formatted guidance and an exit status.
pub struct ErrorHandler {
    prog: String,
    verbose: bool,
}

impl ErrorHandler {
    pub fn new(prog: impl Into<String>) -> Self {
        Self {
            prog: prog.into(),
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn handle(&self, error: &Error) -> String {
        self.enhance(error).format(self.verbose)
    }

    pub fn exit_code(&self, error: &Error) -> u8 {
        self.enhance(error).exit_code()
    }

    pub fn enhance(&self, error: &Error) -> EnhancedError {
        if let Some(enhanced) = error.downcast_ref::<EnhancedError>() {
            return enhanced.clone();
        }
        if let Some(report) = error.downcast_ref::<ErrorReport>() {
            return errors::from_report(report, &self.prog);
        }
        if let Some(color) = error.downcast_ref::<ColorError>() {
            return errors::invalid_color(color);
        }
        let chain = error
            .chain()
            .skip(1)
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        let enhanced = self.classify_error(&error.to_string());
        if chain.is_empty() {
            enhanced
        } else {
            enhanced.with_context(chain.join(": "))
        }
    }

    fn classify_error(&self, error_message: &str) -> EnhancedError {
        let lower_error = error_message.to_lowercase();

        if lower_error.contains("not authenticated") || lower_error.contains("auth token") {
            return errors::from_report(&ErrorReport::auth(error_message), &self.prog);
        }

        if lower_error.contains("timed out")
            || lower_error.contains("connection")
            || lower_error.contains("server")
        {
            return errors::from_report(&ErrorReport::server(error_message), &self.prog);
        }

        if lower_error.contains("config") || lower_error.contains("history file") {
            return EnhancedError::new("Configuration Error", error_message, ErrorType::Unknown)
                .with_suggestion(format!(
                    "Fix or remove the file mentioned above, then run {} again.",
                    self.prog
                ));
        }

        EnhancedError::new("Error", error_message, ErrorType::Unknown)
    }
}

/// Constructors for the failures the CLI reports itself
pub mod errors {
    use super::*;

    /// Guidance for an error reported by the API or the transport.
    pub fn from_report(report: &ErrorReport, prog: &str) -> EnhancedError {
        let error_type = ErrorType::from(report.kind);
        let base = EnhancedError::new(title_for(report.kind), report.message.clone(), error_type);
        match report.kind {
            ErrorKind::Auth => base.with_suggestion(format!("Run: {prog} login")),
            ErrorKind::Server => {
                base.with_suggestion("Try running the same command again a little later.")
            }
            ErrorKind::History => base.with_suggestion(format!("Try running: {prog} -n <question>")),
            ErrorKind::Unknown => base,
        }
    }

    fn title_for(kind: ErrorKind) -> &'static str {
        match kind {
            ErrorKind::Auth => "Authentication Error",
            ErrorKind::Server => "Server Error",
            ErrorKind::History => "History Error",
            ErrorKind::Unknown => "Error",
        }
    }

    pub fn no_arguments(prog: &str) -> EnhancedError {
        EnhancedError::new(
            "Usage Error",
            "No arguments provided. For list of available options, run:",
            ErrorType::Usage,
        )
        .with_suggestion(format!("{prog} --help"))
    }

    pub fn usage(message: impl Into<String>) -> EnhancedError {
        EnhancedError::new("Usage Error", message, ErrorType::Usage)
    }

    pub fn invalid_color(err: &ColorError) -> EnhancedError {
        EnhancedError::new("Usage Error", err.to_string(), ErrorType::Usage).with_suggestion(
            "Valid colors: black, white, gray, red, green, yellow, blue, magenta and cyan, \
             optionally prefixed with \"bright\" and/or \"bold\".",
        )
    }

    pub fn missing_token() -> EnhancedError {
        EnhancedError::new(
            "Authentication Error",
            "No token provided",
            ErrorType::Authentication,
        )
    }

    pub fn invalid_token() -> EnhancedError {
        EnhancedError::new(
            "Authentication Error",
            "Invalid auth token provided",
            ErrorType::Authentication,
        )
        .with_suggestion(format!("Visit {DASHBOARD_URL} to retrieve a valid token."))
    }

    pub fn no_subscription() -> EnhancedError {
        EnhancedError::new(
            "Authentication Error",
            "Your user doesn't have a valid subscription",
            ErrorType::Authentication,
        )
        .with_suggestion(format!("Visit {DASHBOARD_URL} to subscribe."))
    }

    pub fn login_rejected(code: i64) -> EnhancedError {
        EnhancedError::new(
            "Authentication Error",
            format!("Authentication failed with code {code}"),
            ErrorType::Authentication,
        )
    }
}
