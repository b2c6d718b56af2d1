//! HTTP transport used by the client.
//!
//! The client only needs two calls: a multipart POST for submissions and a
//! plain GET for everything else. Both return the raw response body.

use crate::error::Result;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Proxy};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::io::ReaderStream;

/// Value of one multipart form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    /// File on disk, streamed rather than read into memory
    File(PathBuf),
    Bytes { file_name: String, data: Vec<u8> },
}

/// One multipart form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

impl FormField {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: FormValue::Text(value.into()),
        }
    }

    /// Text content of the field, if it is a text field.
    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            FormValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Request/response transport.
///
/// Implementations must surface network failures as errors and return the
/// body verbatim otherwise, whatever the HTTP status.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST a multipart form and return the response body.
    async fn post_form(&self, url: &str, fields: Vec<FormField>) -> Result<String>;

    /// GET a URL and return the response body.
    async fn get(&self, url: &str) -> Result<String>;
}

/// Transport backed by a `reqwest` client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Wrap an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client with optional proxy, bind address and request timeout.
    ///
    /// # Examples
    /// ```ignore
    /// HttpTransport::configured(Some("socks5://127.0.0.1:1080"), None, None)?;
    /// ```
    pub fn configured(
        proxy: Option<&str>,
        local_address: Option<IpAddr>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();

        if let Some(addr) = local_address {
            builder = builder.local_address(addr);
        }

        if let Some(proxy_url) = proxy {
            builder = builder.proxy(Proxy::all(proxy_url)?);
        }

        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self::new(builder.build()?))
    }

    async fn build_form(fields: Vec<FormField>) -> Result<Form> {
        let mut form = Form::new();

        for field in fields {
            form = match field.value {
                FormValue::Text(value) => form.text(field.name, value),
                FormValue::File(path) => {
                    let file = tokio::fs::File::open(&path).await?;
                    let len = file.metadata().await?.len();
                    let file_name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "captcha".to_string());
                    let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
                    form.part(
                        field.name,
                        Part::stream_with_length(body, len).file_name(file_name),
                    )
                }
                FormValue::Bytes { file_name, data } => {
                    form.part(field.name, Part::bytes(data).file_name(file_name))
                }
            };
        }

        Ok(form)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_form(&self, url: &str, fields: Vec<FormField>) -> Result<String> {
        let form = Self::build_form(fields).await?;
        let body = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await?
            .text()
            .await?;
        Ok(body)
    }

    async fn get(&self, url: &str) -> Result<String> {
        let body = self.client.get(url).send().await?.text().await?;
        Ok(body)
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Scripted transport for tests.

    use super::*;
    use crate::error::CaptchaError;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, PartialEq)]
    pub enum Recorded {
        Post { url: String, fields: Vec<FormField> },
        Get { url: String },
    }

    /// Replays queued bodies; once the GET queue is drained it keeps
    /// answering with `get_fallback` if set.
    #[derive(Default)]
    pub struct MockTransport {
        posts: Mutex<VecDeque<Result<String>>>,
        gets: Mutex<VecDeque<Result<String>>>,
        get_fallback: Option<String>,
        pub requests: Mutex<Vec<Recorded>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn on_post(self, body: &str) -> Self {
            self.posts.lock().push_back(Ok(body.to_string()));
            self
        }

        pub fn on_get(self, body: &str) -> Self {
            self.gets.lock().push_back(Ok(body.to_string()));
            self
        }

        pub fn on_get_failure(self, message: &str) -> Self {
            self.gets
                .lock()
                .push_back(Err(CaptchaError::Transport(message.to_string())));
            self
        }

        pub fn always_get(mut self, body: &str) -> Self {
            self.get_fallback = Some(body.to_string());
            self
        }

        pub fn post_count(&self) -> usize {
            self.requests
                .lock()
                .iter()
                .filter(|r| matches!(r, Recorded::Post { .. }))
                .count()
        }

        pub fn get_urls(&self) -> Vec<String> {
            self.requests
                .lock()
                .iter()
                .filter_map(|r| match r {
                    Recorded::Get { url } => Some(url.clone()),
                    _ => None,
                })
                .collect()
        }

        pub fn posted_fields(&self) -> Vec<FormField> {
            self.requests
                .lock()
                .iter()
                .find_map(|r| match r {
                    Recorded::Post { fields, .. } => Some(fields.clone()),
                    _ => None,
                })
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn post_form(&self, url: &str, fields: Vec<FormField>) -> Result<String> {
            self.requests.lock().push(Recorded::Post {
                url: url.to_string(),
                fields,
            });
            self.posts
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(CaptchaError::Transport("unexpected POST".into())))
        }

        async fn get(&self, url: &str) -> Result<String> {
            self.requests.lock().push(Recorded::Get {
                url: url.to_string(),
            });
            if let Some(next) = self.gets.lock().pop_front() {
                return next;
            }
            match &self.get_fallback {
                Some(body) => Ok(body.clone()),
                None => Err(CaptchaError::Transport("unexpected GET".into())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_form_field_text() {
        let field = FormField::text("key", "abc");
        assert_eq!(field.as_text(), Some("abc"));

        let file = FormField {
            name: "file".into(),
            value: FormValue::File("/tmp/x.png".into()),
        };
        assert_eq!(file.as_text(), None);
    }

    #[tokio::test]
    async fn test_build_form_streams_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"\x89PNG fake image").unwrap();

        let fields = vec![
            FormField::text("key", "abc"),
            FormField {
                name: "file".into(),
                value: FormValue::File(tmp.path().to_path_buf()),
            },
        ];
        assert!(HttpTransport::build_form(fields).await.is_ok());
    }

    #[tokio::test]
    async fn test_build_form_missing_file() {
        let fields = vec![FormField {
            name: "file".into(),
            value: FormValue::File("/definitely/not/here.png".into()),
        }];
        let result = HttpTransport::build_form(fields).await;
        assert!(matches!(result, Err(crate::error::CaptchaError::Io(_))));
    }
}
