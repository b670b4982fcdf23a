//! Line-delimited JSON transport
//!
//! One request object per input line, one response object per output line:
//!
//! ```text
//! -> {"id": 1, "command": "rank", "params": {"kpi": "spending", "count": 3}}
//! <- {"id": 1, "success": true, "payload": {...}}
//! ```
//!
//! The loop ends when the input reaches EOF. Logs must not go to stdout while
//! this runs over stdio.

use sdk::types::{CommandRequest, CommandResult};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::LeadConsole;

/// A command result tagged with the request's correlation id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,

    #[serde(flatten)]
    pub result: CommandResult,
}

/// Answer one input line
pub async fn handle_line(console: &mut LeadConsole, line: &str) -> CommandResponse {
    match serde_json::from_str::<CommandRequest>(line) {
        Ok(request) => CommandResponse {
            id: request.id.clone(),
            result: console.dispatch(&request).await,
        },
        Err(e) => {
            tracing::warn!("Unparsable request line: {}", e);
            CommandResponse {
                id: None,
                result: CommandResult::failure(format!("Invalid request: {}", e)),
            }
        }
    }
}

/// Serve requests from `reader` until EOF
///
/// A line that is not valid UTF-8 gets a failure response like any other
/// unparsable line. Returns the number of requests answered.
pub async fn serve<R, W>(
    console: &mut LeadConsole,
    mut reader: R,
    mut writer: W,
) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut answered = 0;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }

        let response = match std::str::from_utf8(&buf) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => handle_line(console, line.trim_end_matches(['\n', '\r'])).await,
            Err(e) => {
                tracing::warn!("Request line is not valid UTF-8: {}", e);
                CommandResponse {
                    id: None,
                    result: CommandResult::failure(format!("Invalid request: {}", e)),
                }
            }
        };

        let encoded = serde_json::to_string(&response)
            .unwrap_or_else(|_| r#"{"success":false,"message":"Failed to encode response"}"#.to_string());

        writer.write_all(encoded.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
        answered += 1;
    }

    tracing::info!("Input closed after {} request(s)", answered);
    Ok(answered)
}

/// Serve on the process's stdin and stdout
pub async fn serve_stdio(console: &mut LeadConsole) -> std::io::Result<usize> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(console, stdin, stdout).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ConsoleSettings;
    use async_trait::async_trait;
    use sdk::collaborator::{Analyst, SocialClient};
    use sdk::errors::EngineError;
    use sdk::thread::RawThread;

    struct Offline;

    #[async_trait]
    impl SocialClient for Offline {
        fn self_identity(&self) -> &str {
            "100"
        }

        async fn list_recent_threads(
            &self,
            _max_threads: usize,
            _max_messages_per_thread: usize,
        ) -> Result<Vec<RawThread>, EngineError> {
            Ok(Vec::new())
        }

        async fn resolve_identity(&self, _display_name: &str) -> Result<Option<String>, EngineError> {
            Ok(None)
        }

        async fn send_message(&self, _identity: &str, _text: &str) -> Result<(), EngineError> {
            Ok(())
        }
    }

    #[async_trait]
    impl Analyst for Offline {
        fn name(&self) -> &str {
            "offline"
        }

        async fn analyze(&self, _prompt: &str) -> Result<String, EngineError> {
            Err(EngineError::Analyst("offline".to_string()))
        }
    }

    fn console() -> LeadConsole {
        LeadConsole::new(
            Box::new(Offline),
            Box::new(Offline),
            ConsoleSettings::default(),
        )
    }

    #[tokio::test]
    async fn test_one_response_per_request_line() {
        let input = concat!(
            r#"{"id": 1, "command": "list_kpis"}"#,
            "\n\n",
            r#"{"id": "b", "command": "show_dashboard"}"#,
            "\n",
            "not json\n",
            r#"{"command": "fly"}"#,
            "\n",
        );
        let mut output = Vec::new();
        let mut console = console();

        let answered = serve(&mut console, input.as_bytes(), &mut output)
            .await
            .unwrap();
        assert_eq!(answered, 4);

        let responses: Vec<CommandResponse> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(responses[0].id, Some(serde_json::json!(1)));
        assert!(responses[0].result.success);

        assert_eq!(responses[1].id, Some(serde_json::json!("b")));
        assert!(!responses[1].result.success);

        assert_eq!(responses[2].id, None);
        assert!(responses[2]
            .result
            .message
            .as_deref()
            .unwrap()
            .starts_with("Invalid request"));

        assert_eq!(
            responses[3].result.message.as_deref(),
            Some("Unknown command: fly")
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_stop_the_loop() {
        let mut input = Vec::new();
        input.extend_from_slice(br#"{"id": 1, "command": "list_kpis"}"#);
        input.push(b'\n');
        input.extend_from_slice(&[0xff, 0xfe, b'\n']);
        input.extend_from_slice(br#"{"id": 3, "command": "reset"}"#);

        let mut output = Vec::new();
        let mut console = console();
        let answered = serve(&mut console, input.as_slice(), &mut output)
            .await
            .unwrap();
        assert_eq!(answered, 3);

        let responses: Vec<CommandResponse> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert!(responses[0].result.success);
        assert!(!responses[1].result.success);
        assert!(responses[1]
            .result
            .message
            .as_deref()
            .unwrap()
            .starts_with("Invalid request"));
        assert_eq!(responses[2].id, Some(serde_json::json!(3)));
        assert_eq!(
            responses[2].result.message.as_deref(),
            Some("Session cleared.")
        );
    }

    #[tokio::test]
    async fn test_response_is_flat() {
        let mut console = console();
        let response = handle_line(&mut console, r#"{"id": 9, "command": "reset"}"#).await;
        let encoded = serde_json::to_string(&response).unwrap();
        assert_eq!(
            encoded,
            r#"{"id":9,"success":true,"message":"Session cleared."}"#
        );
    }
}
