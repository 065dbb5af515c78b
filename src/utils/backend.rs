use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Profile
// ============================================================================

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// A named set of connection parameters for a model-serving backend.
///
/// The presence of an API key selects the wire protocol: with a key the
/// endpoint is treated as an OpenAI-compatible chat-completions server,
/// without one as a local Ollama-style generate server.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendProfile {
    pub name: String,
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

impl BackendProfile {
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|key| !key.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ============================================================================
// Stream Event Types
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    Content(String),
    Done,
    Error(String),
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done | StreamEvent::Error(_))
    }
}

/// Cooperative cancellation flag shared between the controller and the
/// runner. The runner polls it between stream reads and drops the response
/// (closing the connection) once it is set.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatRequestMessage<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatRequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatChunk {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    delta: Option<ChatDelta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
}

// ============================================================================
// Backend Client
// ============================================================================

pub struct BackendClient {
    client: reqwest::Client,
}

impl BackendClient {
    /// Builds a client with the profile's per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| format!("failed to build HTTP client: {}", e))?;

        Ok(Self { client })
    }

    /// Executes one streaming call, delivering every outcome through `tx`.
    ///
    /// Content events arrive in stream order and exactly one terminal event
    /// (`Done` or `Error`) is last. Nothing is emitted once the cancel flag
    /// has been observed, and failures never propagate to the caller.
    pub async fn run_stream(
        &self,
        profile: &BackendProfile,
        prompt: &str,
        cancel: CancelFlag,
        tx: async_channel::Sender<StreamEvent>,
    ) {
        let result = if profile.has_api_key() {
            self.stream_chat(profile, prompt, &cancel, &tx).await
        } else {
            self.stream_generate(profile, prompt, &cancel, &tx).await
        };

        if let Err(message) = result {
            if !cancel.is_cancelled() {
                let _ = tx.send(StreamEvent::Error(message)).await;
            }
        }
    }

    async fn stream_chat(
        &self,
        profile: &BackendProfile,
        prompt: &str,
        cancel: &CancelFlag,
        tx: &async_channel::Sender<StreamEvent>,
    ) -> Result<(), String> {
        let url = format!("{}/chat/completions", profile.endpoint.trim_end_matches('/'));
        let request = ChatRequest {
            model: &profile.model,
            messages: vec![ChatRequestMessage {
                role: "user",
                content: prompt,
            }],
            stream: true,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(profile.api_key.as_deref().unwrap_or_default())
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("chat request failed: {}", e))?;
        let response = check_status(response, "chat").await?;

        let mut bytes_stream = response.bytes_stream();
        let mut partial = String::new();

        loop {
            if cancel.is_cancelled() {
                // Dropping `bytes_stream` closes the connection.
                return Ok(());
            }

            let (events, at_end) = match bytes_stream.next().await {
                Some(Ok(bytes)) => {
                    partial.push_str(&String::from_utf8_lossy(&bytes));
                    (drain_sse_events(&mut partial, false), false)
                }
                Some(Err(e)) => return Err(format!("chat stream failed: {}", e)),
                None => (drain_sse_events(&mut partial, true), true),
            };

            if deliver(events, cancel, tx).await {
                return Ok(());
            }

            if at_end {
                let _ = tx.send(StreamEvent::Done).await;
                return Ok(());
            }
        }
    }

    async fn stream_generate(
        &self,
        profile: &BackendProfile,
        prompt: &str,
        cancel: &CancelFlag,
        tx: &async_channel::Sender<StreamEvent>,
    ) -> Result<(), String> {
        let request = GenerateRequest {
            model: &profile.model,
            prompt,
            stream: true,
        };

        let response = self
            .client
            .post(&profile.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("generate request failed: {}", e))?;
        let response = check_status(response, "generate").await?;

        let mut bytes_stream = response.bytes_stream();
        let mut partial = String::new();

        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            let (events, at_end) = match bytes_stream.next().await {
                Some(Ok(bytes)) => {
                    partial.push_str(&String::from_utf8_lossy(&bytes));
                    (drain_generate_events(&mut partial, false), false)
                }
                Some(Err(e)) => return Err(format!("generate stream failed: {}", e)),
                None => (drain_generate_events(&mut partial, true), true),
            };

            if deliver(events, cancel, tx).await {
                return Ok(());
            }

            if at_end {
                let _ = tx.send(StreamEvent::Done).await;
                return Ok(());
            }
        }
    }
}

/// Forwards parsed events in order. Returns true once a terminal event has
/// been sent (or delivery stopped), so the caller can bail out without
/// emitting a second terminal.
async fn deliver(
    events: Vec<StreamEvent>,
    cancel: &CancelFlag,
    tx: &async_channel::Sender<StreamEvent>,
) -> bool {
    for event in events {
        if cancel.is_cancelled() {
            return true;
        }
        let terminal = event.is_terminal();
        if tx.send(event).await.is_err() || terminal {
            return true;
        }
    }
    false
}

async fn check_status(response: reqwest::Response, context: &str) -> Result<reqwest::Response, String> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    let message = extract_api_error(&body).unwrap_or(body);

    Err(format!("{} endpoint returned {}: {}", context, status, message))
}

/// Pulls `error.message` out of a JSON error body when the backend sends one.
fn extract_api_error(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}

// ============================================================================
// SSE Parsing (chat protocol)
// ============================================================================

/// Splits complete lines off the partial buffer and parses each as an SSE
/// record. Safe across arbitrary network chunk boundaries; the trailing
/// fragment stays in the buffer until its newline arrives (or the stream
/// ends and `flush_remaining` is set).
fn drain_sse_events(buffer: &mut String, flush_remaining: bool) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    while let Some(newline_idx) = buffer.find('\n') {
        let mut line: String = buffer.drain(..=newline_idx).collect();
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        parse_sse_line(&line, &mut events);
    }

    if flush_remaining && !buffer.trim().is_empty() {
        let line = std::mem::take(buffer);
        parse_sse_line(line.trim(), &mut events);
    }

    events
}

fn parse_sse_line(line: &str, events: &mut Vec<StreamEvent>) {
    let line = line.trim();

    // Blank keep-alives and comment lines carry no payload.
    if line.is_empty() || line.starts_with(':') {
        return;
    }

    let Some(data) = line.strip_prefix("data:") else {
        return;
    };
    let data = data.trim_start();

    if data == "[DONE]" {
        events.push(StreamEvent::Done);
        return;
    }

    match serde_json::from_str::<ChatChunk>(data) {
        Ok(chunk) => {
            if let Some(error) = chunk.error {
                events.push(StreamEvent::Error(error.message));
                return;
            }

            if let Some(choice) = chunk.choices.first() {
                if let Some(content) = choice.delta.as_ref().and_then(|d| d.content.as_deref()) {
                    if !content.is_empty() {
                        events.push(StreamEvent::Content(content.to_string()));
                    }
                }

                match choice.finish_reason.as_deref() {
                    Some("error") => {
                        events.push(StreamEvent::Error("stream terminated with an error".to_string()));
                    }
                    Some(reason) if !reason.is_empty() => events.push(StreamEvent::Done),
                    _ => {}
                }
            }
        }
        Err(e) => {
            // Payload contents stay out of the log.
            eprintln!("skipping malformed SSE line: {} (payload_len={})", e, data.len());
        }
    }
}

// ============================================================================
// NDJSON Parsing (generate protocol)
// ============================================================================

/// Same line-buffering as the SSE path, but each complete line is one JSON
/// object whose `response` field holds a text fragment.
fn drain_generate_events(buffer: &mut String, flush_remaining: bool) -> Vec<StreamEvent> {
    let mut events = Vec::new();

    while let Some(newline_idx) = buffer.find('\n') {
        let mut line: String = buffer.drain(..=newline_idx).collect();
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        parse_generate_line(&line, &mut events);
    }

    if flush_remaining && !buffer.trim().is_empty() {
        let line = std::mem::take(buffer);
        parse_generate_line(line.trim(), &mut events);
    }

    events
}

fn parse_generate_line(line: &str, events: &mut Vec<StreamEvent>) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }

    match serde_json::from_str::<GenerateChunk>(line) {
        Ok(chunk) => {
            if !chunk.response.is_empty() {
                events.push(StreamEvent::Content(chunk.response));
            }
            if chunk.done {
                events.push(StreamEvent::Done);
            }
        }
        Err(e) => {
            eprintln!("skipping malformed generate line: {} (payload_len={})", e, line.len());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(api_key: Option<&str>) -> BackendProfile {
        BackendProfile {
            name: "test".to_string(),
            endpoint: "http://localhost:11434/api/generate".to_string(),
            api_key: api_key.map(|k| k.to_string()),
            model: "test-model".to_string(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn key_presence_selects_protocol() {
        assert!(!profile(None).has_api_key());
        assert!(!profile(Some("")).has_api_key());
        assert!(!profile(Some("   ")).has_api_key());
        assert!(profile(Some("sk-test")).has_api_key());
    }

    #[test]
    fn cancel_flag_is_shared() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
    }

    #[test]
    fn sse_done_marker() {
        let mut buffer = "data: [DONE]\n".to_string();
        let events = drain_sse_events(&mut buffer, false);
        assert_eq!(events, vec![StreamEvent::Done]);
    }

    #[test]
    fn sse_comment_and_blank_lines_are_skipped() {
        let mut buffer = ": keep-alive\n\n\n".to_string();
        let events = drain_sse_events(&mut buffer, false);
        assert!(events.is_empty());
    }

    #[test]
    fn sse_delta_content() {
        let mut buffer =
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"},\"finish_reason\":null}]}\n"
                .to_string();
        let events = drain_sse_events(&mut buffer, false);
        assert_eq!(events, vec![StreamEvent::Content("Hello".to_string())]);
    }

    #[test]
    fn sse_line_split_across_chunks() {
        let mut buffer = String::new();
        buffer.push_str("data: {\"choices\":[{\"delta\":{\"content\":\"Hel");
        assert!(drain_sse_events(&mut buffer, false).is_empty());

        buffer.push_str("lo\"},\"finish_reason\":null}]}\n");
        let events = drain_sse_events(&mut buffer, false);
        assert_eq!(events, vec![StreamEvent::Content("Hello".to_string())]);
    }

    #[test]
    fn sse_embedded_error_object() {
        let mut buffer = "data: {\"error\":{\"message\":\"invalid key\"},\"choices\":[]}\n".to_string();
        let events = drain_sse_events(&mut buffer, false);
        assert_eq!(events, vec![StreamEvent::Error("invalid key".to_string())]);
    }

    #[test]
    fn sse_finish_reason_ends_stream() {
        let mut buffer =
            "data: {\"choices\":[{\"delta\":{\"content\":\"!\"},\"finish_reason\":\"stop\"}]}\n"
                .to_string();
        let events = drain_sse_events(&mut buffer, false);
        assert_eq!(
            events,
            vec![StreamEvent::Content("!".to_string()), StreamEvent::Done]
        );
    }

    #[test]
    fn sse_malformed_line_is_skipped() {
        let mut buffer = "data: {not json}\ndata: [DONE]\n".to_string();
        let events = drain_sse_events(&mut buffer, false);
        assert_eq!(events, vec![StreamEvent::Done]);
    }

    #[test]
    fn sse_flush_parses_trailing_fragment() {
        let mut buffer = "data: [DONE]".to_string();
        assert!(drain_sse_events(&mut buffer, false).is_empty());

        let mut buffer = "data: [DONE]".to_string();
        let events = drain_sse_events(&mut buffer, true);
        assert_eq!(events, vec![StreamEvent::Done]);
    }

    #[test]
    fn generate_fragments_in_order() {
        let mut buffer =
            "{\"response\":\"Hel\"}\n{\"response\":\"lo\"}\n{\"response\":\"\",\"done\":true}\n"
                .to_string();
        let events = drain_generate_events(&mut buffer, false);
        assert_eq!(
            events,
            vec![
                StreamEvent::Content("Hel".to_string()),
                StreamEvent::Content("lo".to_string()),
                StreamEvent::Done,
            ]
        );
    }

    #[test]
    fn generate_line_split_across_chunks() {
        let mut buffer = String::new();
        buffer.push_str("{\"response\":\"par");
        assert!(drain_generate_events(&mut buffer, false).is_empty());

        buffer.push_str("tial\"}\n");
        let events = drain_generate_events(&mut buffer, false);
        assert_eq!(events, vec![StreamEvent::Content("partial".to_string())]);
    }

    #[test]
    fn generate_malformed_line_is_skipped() {
        let mut buffer = "not json at all\n{\"response\":\"ok\"}\n".to_string();
        let events = drain_generate_events(&mut buffer, false);
        assert_eq!(events, vec![StreamEvent::Content("ok".to_string())]);
    }

    #[test]
    fn extract_api_error_from_json_body() {
        let body = "{\"error\":{\"message\":\"quota exceeded\",\"code\":429}}";
        assert_eq!(extract_api_error(body), Some("quota exceeded".to_string()));
        assert_eq!(extract_api_error("plain text"), None);
    }
}
