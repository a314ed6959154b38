//! Remote (HTTP/HTTPS) fetcher.

use std::io::Read;
use std::time::Duration;

use crate::error::FetchError;

/// Response from a remote fetch: the body plus whatever CORS header it carried, which
/// the resolver needs for its own origin policy — the fetcher itself
/// applies no policy, it just reports what the server said.
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub access_control_allow_origin: Option<String>,
}

pub trait HttpClient: Send + Sync {
    fn get(&self, url: &url::Url, timeout: Duration) -> Result<HttpResponse, FetchError>;
}

/// Blocking HTTP client backed by `ureq`. Parsing is single-threaded; resolution
/// of independent import subtrees may run on separate threads, each with its own
/// client call, so this type carries no shared mutable state beyond `ureq`'s own
/// connection pool.
pub struct UreqHttpClient {
    agent: ureq::Agent,
}

impl UreqHttpClient {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
        }
    }
}

impl Default for UreqHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for UreqHttpClient {
    fn get(&self, url: &url::Url, timeout: Duration) -> Result<HttpResponse, FetchError> {
        let request = self.agent.get(url.as_str()).timeout(timeout);

        match request.call() {
            Ok(response) => {
                let status = response.status();
                let acao = response
                    .header("Access-Control-Allow-Origin")
                    .map(str::to_owned);
                let mut body = Vec::new();
                response
                    .into_reader()
                    .read_to_end(&mut body)
                    .map_err(|e| FetchError::Http(Box::new(e)))?;
                Ok(HttpResponse {
                    status,
                    body,
                    access_control_allow_origin: acao,
                })
            }
            // `ureq` treats non-2xx as an error carrying the response; we only need the
            // status code to report the failure, not the body.
            Err(ureq::Error::Status(status, _response)) => Err(FetchError::HttpStatus(status)),
            Err(ureq::Error::Transport(t)) => Err(FetchError::Http(Box::new(t))),
        }
    }
}

/// A fixed set of canned responses, for hermetic resolver tests.
#[derive(Default)]
pub struct FakeHttpClient(std::collections::HashMap<String, (u16, Vec<u8>, Option<String>)>);

impl FakeHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        url: impl Into<String>,
        status: u16,
        body: impl Into<Vec<u8>>,
        acao: Option<&str>,
    ) -> Self {
        self.0
            .insert(url.into(), (status, body.into(), acao.map(str::to_owned)));
        self
    }
}

impl HttpClient for FakeHttpClient {
    fn get(&self, url: &url::Url, _timeout: Duration) -> Result<HttpResponse, FetchError> {
        match self.0.get(url.as_str()) {
            Some((status, body, acao)) if (200..300).contains(status) => Ok(HttpResponse {
                status: *status,
                body: body.clone(),
                access_control_allow_origin: acao.clone(),
            }),
            Some((status, _, _)) => Err(FetchError::HttpStatus(*status)),
            None => Err(FetchError::HttpStatus(404)),
        }
    }
}
