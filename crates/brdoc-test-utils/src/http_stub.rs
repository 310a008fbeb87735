//! Minimal HTTP stub for exercising model endpoints in tests.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Spawn a stub HTTP server answering every POST with the given JSON
/// body. Returns the base URL to point a client at.
///
/// The stub reads the full request (honouring `Content-Length`) so
/// keep-alive clients do not see a reset mid-request.
pub async fn spawn_json_stub(body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub addr");

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let body = body.clone();
            tokio::spawn(async move {
                let mut buffer = Vec::new();
                let mut chunk = [0u8; 4096];
                // Read headers, then the declared body length.
                let mut header_end = None;
                while header_end.is_none() {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buffer.extend_from_slice(&chunk[..n]),
                    }
                    header_end = buffer.windows(4).position(|w| w == b"\r\n\r\n");
                }
                let header_end = header_end.unwrap() + 4;
                let headers = String::from_utf8_lossy(&buffer[..header_end]).to_lowercase();
                let content_length: usize = headers
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(0);
                while buffer.len() < header_end + content_length {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => buffer.extend_from_slice(&chunk[..n]),
                    }
                }

                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{addr}")
}

/// A canned Ollama-style generate reply.
pub fn ollama_reply(content: &str) -> String {
    serde_json::json!({
        "response": content,
        "eval_count": 128,
    })
    .to_string()
}

/// A canned OpenAI-style chat-completion reply.
pub fn chat_completion_reply(content: &str) -> String {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}],
        "usage": {"total_tokens": 256},
    })
    .to_string()
}
