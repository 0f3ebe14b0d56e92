use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// A completed HTTP exchange: status code plus the raw body text.
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Blocking GET transport. Parsers talk to the network only through this
/// seam, so tests can substitute scripted responses.
pub trait Transport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response> {
        (**self).get(url, query)
    }
}

pub struct HttpTransport;

static CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .timeout(Duration::from_secs(20))
        .user_agent("event-scrape/0.1 (+https://github.com/mike/event-scrape)")
        .build()
        .expect("http client")
});

impl Transport for HttpTransport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> Result<Response> {
        let response = CLIENT.get(url).query(query).send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(Response { status, body })
    }
}
