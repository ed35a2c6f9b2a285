use anyhow::{Result, anyhow};
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use senpai_core::{ContentFragment, ErrorReport, HistoryEntry, SystemMetadata};
use serde::Serialize;
use serde_json::Value;
use std::error::Error as StdError;
use std::io::{BufRead, BufReader};
use std::time::Duration;

/// Fragments of one answer, in arrival order.
pub type ResponseStream = Box<dyn Iterator<Item = Result<ContentFragment, ErrorReport>> + Send>;

pub trait SenpaiClient: Send + Sync {
    /// Validates an auth token against the service.
    fn login(&self, token: &str) -> Result<LoginOutcome>;

    /// Sends a question together with the conversation history.
    fn question(&self, req: &QuestionRequest) -> std::result::Result<ResponseStream, ErrorReport>;

    /// Asks for the common use cases of a single command.
    fn explain(&self, command: &str) -> std::result::Result<ResponseStream, ErrorReport>;
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub host: String,
    pub timeout_seconds: u64,
    pub token: Option<String>,
    pub version: String,
    pub persona: String,
}

#[derive(Debug, Clone, Default)]
pub struct QuestionRequest {
    pub question: String,
    pub history: Vec<HistoryEntry>,
    pub metadata: Option<SystemMetadata>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Accepted,
    Rejected(LoginRejection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginRejection {
    MissingToken,
    InvalidToken,
    NoSubscription,
    Other(i64),
}

impl LoginRejection {
    fn from_code(code: i64) -> Self {
        match code {
            1 => Self::MissingToken,
            2 => Self::InvalidToken,
            3 => Self::NoSubscription,
            other => Self::Other(other),
        }
    }
}

#[derive(Serialize)]
struct AuthPayload<'a> {
    token: &'a str,
}

#[derive(Serialize)]
struct PromptPayload<'a> {
    token: &'a str,
    version: &'a str,
    persona: &'a str,
    question: &'a str,
    history: &'a [HistoryEntry],
    metadata: Option<&'a SystemMetadata>,
}

#[derive(Serialize)]
struct ExplainPayload<'a> {
    token: &'a str,
    version: &'a str,
    persona: &'a str,
    question: &'a str,
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    cfg: ClientConfig,
    client: Client,
}

impl HttpClient {
    pub fn new(cfg: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_seconds))
            .build()?;
        Ok(Self { cfg, client })
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{name}/", self.cfg.host.trim_end_matches('/'))
    }

    fn require_token(&self) -> std::result::Result<&str, ErrorReport> {
        self.cfg
            .token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(ErrorReport::not_authenticated)
    }

    fn open_stream<T: Serialize>(
        &self,
        name: &str,
        payload: &T,
    ) -> std::result::Result<ResponseStream, ErrorReport> {
        let response = self
            .client
            .post(self.endpoint(name))
            .json(payload)
            .send()
            .map_err(|err| format_transport_error(&err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(format_api_error(status, &body));
        }
        Ok(Box::new(FragmentReader::new(BufReader::new(response))))
    }
}

impl SenpaiClient for HttpClient {
    fn login(&self, token: &str) -> Result<LoginOutcome> {
        let response = self
            .client
            .post(self.endpoint("auth"))
            .json(&AuthPayload { token })
            .send()
            .map_err(|err| anyhow::Error::new(format_transport_error(&err)))?;
        parse_login_response(response)
    }

    fn question(&self, req: &QuestionRequest) -> std::result::Result<ResponseStream, ErrorReport> {
        let token = self.require_token()?;
        self.open_stream(
            "prompt",
            &PromptPayload {
                token,
                version: &self.cfg.version,
                persona: &self.cfg.persona,
                question: &req.question,
                history: &req.history,
                metadata: req.metadata.as_ref(),
            },
        )
    }

    fn explain(&self, command: &str) -> std::result::Result<ResponseStream, ErrorReport> {
        let token = self.require_token()?;
        self.open_stream(
            "explain",
            &ExplainPayload {
                token,
                version: &self.cfg.version,
                persona: &self.cfg.persona,
                question: command,
            },
        )
    }
}

fn parse_login_response(response: Response) -> Result<LoginOutcome> {
    let status = response.status();
    let body = response.text()?;
    let value: Value = serde_json::from_str(&body).map_err(|_| {
        anyhow::Error::new(ErrorReport::server(format!(
            "Unexpected response from the auth endpoint (HTTP {})",
            status.as_u16()
        )))
    })?;
    if value.get("success").and_then(Value::as_bool) == Some(true) {
        return Ok(LoginOutcome::Accepted);
    }
    if let Some(code) = value
        .get("error")
        .and_then(|err| err.get("code"))
        .and_then(Value::as_i64)
    {
        return Ok(LoginOutcome::Rejected(LoginRejection::from_code(code)));
    }
    Err(anyhow!(
        "auth endpoint returned HTTP {} without a result",
        status.as_u16()
    ))
}

/// Reads newline-delimited JSON fragments from a byte stream.
///
/// Stops after the first decoding or transport error.
pub struct FragmentReader<R> {
    reader: R,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> FragmentReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for FragmentReader<R> {
    type Item = std::result::Result<ContentFragment, ErrorReport>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                }
                Ok(_) => {
                    let line = String::from_utf8_lossy(&self.buf);
                    match ContentFragment::from_json_line(&line) {
                        Ok(Some(fragment)) => return Some(Ok(fragment)),
                        Ok(None) => continue,
                        Err(err) => {
                            self.done = true;
                            return Some(Err(err));
                        }
                    }
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(ErrorReport::from(err)));
                }
            }
        }
        None
    }
}

/// Produce a report from a non-success HTTP response.
fn format_api_error(status: StatusCode, body: &str) -> ErrorReport {
    // The service reports failures with the same error object it streams.
    if let Some(report) = body
        .lines()
        .filter_map(|line| serde_json::from_str::<Value>(line.trim()).ok())
        .find(|value| value.get("error").is_some_and(|flag| flag != &Value::Bool(false)))
        .map(|value| ErrorReport::from_value(&value))
    {
        return report;
    }

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ErrorReport::not_authenticated(),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ErrorReport::server("The server took too long to respond")
        }
        _ => {
            let detail: String = body.trim().chars().take(200).collect();
            if detail.is_empty() {
                ErrorReport::server(format!("Server responded with HTTP {}", status.as_u16()))
            } else {
                ErrorReport::server(format!(
                    "Server responded with HTTP {}: {detail}",
                    status.as_u16()
                ))
            }
        }
    }
}

/// Produce a report from a transport/network failure.
fn format_transport_error(err: &reqwest::Error) -> ErrorReport {
    let inner_msg = err
        .source()
        .map(|e| e.to_string())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let is_dns = inner_msg.contains("dns")
        || inner_msg.contains("resolve")
        || inner_msg.contains("name or service not known")
        || inner_msg.contains("no such host")
        || inner_msg.contains("getaddrinfo");

    if err.is_timeout() {
        ErrorReport::server("The request timed out before the server answered")
    } else if is_dns {
        ErrorReport::server("Unknown server error occured: could not resolve the API hostname")
    } else if err.is_connect() {
        ErrorReport::server("Unknown server error occured: could not connect to the API")
    } else {
        ErrorReport::server(format!("Unknown server error occured: {err}"))
    }
}
