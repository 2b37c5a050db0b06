// src/notify/twilio.rs
//! SMS through the Twilio Messages API: one form POST per alert, HTTP basic auth with
//! the account SID and auth token.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use super::Notifier;
use crate::config::consts::USER_AGENT;
use crate::error::NotifyError;

const API_BASE: &str = "https://api.twilio.com/2010-04-01";
const SEND_TIMEOUT: Duration = Duration::from_secs(30);

pub struct TwilioNotifier {
    account_sid: String,
    auth_token: String,
    base_url: String,
    client: Client,
}

impl TwilioNotifier {
    pub fn new(account_sid: &str, auth_token: &str) -> Result<Self, NotifyError> {
        let client = Client::builder().user_agent(USER_AGENT).timeout(SEND_TIMEOUT).build()?;
        Ok(Self {
            account_sid: account_sid.to_string(),
            auth_token: auth_token.to_string(),
            base_url: API_BASE.to_string(),
            client,
        })
    }

    /// Point at another API root (a local mock in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn messages_url(&self) -> String {
        format!("{}/Accounts/{}/Messages.json", self.base_url.trim_end_matches('/'), self.account_sid)
    }
}

impl Notifier for TwilioNotifier {
    fn send(&self, to: &str, from: &str, body: &str) -> Result<(), NotifyError> {
        let url = self.messages_url();
        debug!(%url, %to, "posting SMS");

        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", from), ("Body", body)])
            .send()?;

        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = resp.text().unwrap_or_default();
            Err(NotifyError::Rejected { status: status.as_u16(), body })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Accept one request, answer with `status`, and hand back what was received.
    fn one_shot_server(status: &'static str, reply: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = v.trim().parse().unwrap();
                }
                let end = line == "\r\n";
                head.push_str(&line);
                if end {
                    break;
                }
            }
            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).unwrap();
            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{reply}",
                reply.len()
            )
            .unwrap();
            head + &String::from_utf8(body).unwrap()
        });
        (format!("http://{addr}"), handle)
    }

    #[test]
    fn url_includes_account() {
        let n = TwilioNotifier::new("AC42", "t").unwrap().with_base_url("http://localhost:1/");
        assert_eq!(n.messages_url(), "http://localhost:1/Accounts/AC42/Messages.json");
    }

    #[test]
    fn posts_form_with_basic_auth() {
        let (base, server) = one_shot_server("201 Created", r#"{"sid":"SM1"}"#);
        let n = TwilioNotifier::new("AC42", "tok").unwrap().with_base_url(base);
        n.send("+2000", "+1000", "Found a deal").unwrap();

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /Accounts/AC42/Messages.json"));
        // base64("AC42:tok")
        assert!(request.contains("QUM0Mjp0b2s="));
        assert!(request.contains("To=%2B2000"));
        assert!(request.contains("Body=Found+a+deal"));
    }

    #[test]
    fn built_client_carries_the_user_agent() {
        let (base, server) = one_shot_server("201 Created", "{}");
        let n = TwilioNotifier::new("AC42", "tok").unwrap().with_base_url(base);
        n.send("+2000", "+1000", "hi").unwrap();
        let request = server.join().unwrap().to_ascii_lowercase();
        assert!(request.contains(&format!("user-agent: {}", USER_AGENT.to_ascii_lowercase())));
    }

    #[test]
    fn non_success_is_rejected() {
        let (base, server) = one_shot_server("401 Unauthorized", r#"{"code":20003}"#);
        let n = TwilioNotifier::new("AC42", "bad").unwrap().with_base_url(base);
        let err = n.send("+2000", "+1000", "hi").unwrap_err();
        server.join().unwrap();
        match err {
            NotifyError::Rejected { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("20003"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
