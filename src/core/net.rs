// src/core/net.rs
// Blocking HTTP GET with a hard deadline. The loop is single-threaded, so no runtime.

use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::consts::USER_AGENT;
use crate::error::PageError;

pub fn client(timeout: Duration) -> Result<Client, PageError> {
    Ok(Client::builder().user_agent(USER_AGENT).timeout(timeout).build()?)
}

/// GET `url` with `query`, returning the body of a 2xx response.
pub fn http_get(client: &Client, url: &str, query: &[(&str, String)]) -> Result<String, PageError> {
    let resp = client.get(url).query(query).send()?;
    let status = resp.status();
    if !status.is_success() {
        return Err(PageError::Status { status: status.as_u16(), url: resp.url().to_string() });
    }
    Ok(resp.text()?)
}
