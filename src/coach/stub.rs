//! In-process HTTP stub standing in for the Ollama server in tests.

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;

/// Serve one canned HTTP response per connection and hand back each
/// request body.
pub fn serve(responses: Vec<(u16, String)>) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || {
        for (status, body) in responses {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let _ = tx.send(request);

            let reply = format!(
                "HTTP/1.1 {} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(reply.as_bytes()).unwrap();
        }
    });

    (format!("http://{}", addr), rx)
}

fn read_request(stream: &mut std::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];

    loop {
        let n = stream.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);

            if data.len() >= header_end + 4 + content_length {
                return text[header_end + 4..].to_string();
            }
        }
    }

    String::from_utf8_lossy(&data).to_string()
}

pub fn chat_body(content: &str) -> String {
    serde_json::json!({
        "model": "test-model",
        "message": {"role": "assistant", "content": content},
        "done": true
    })
    .to_string()
}
