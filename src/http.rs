use crate::config::ClientConfig;
use crate::errors::ApiError;
use reqwest::{
    Client, Method, RequestBuilder, StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue},
    multipart::Form,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Parsed response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Json(Value),
    Text(String),
}

impl Body {
    /// Decodes a JSON body into `T`. Text bodies are a decode error.
    pub fn json<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        match self {
            Body::Json(value) => serde_json::from_value(value).map_err(ApiError::decode),
            Body::Text(text) => Err(ApiError::Decode(format!(
                "expected a JSON response, got text: {}",
                truncate(&text, 80)
            ))),
        }
    }

    pub fn into_value(self) -> Value {
        match self {
            Body::Json(value) => value,
            Body::Text(text) => Value::String(text),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(HeaderName, HeaderValue)>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query<K: ToString, V: ToString>(mut self, params: &[(K, V)]) -> Self {
        self.query
            .extend(params.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.push((name, value));
        self
    }

    pub fn bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }
}

/// Thin wrapper over `reqwest` bound to one backend.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn get(
        &self,
        path: &str,
        query: &[(&str, String)],
        bearer: Option<String>,
    ) -> Result<Body, ApiError> {
        self.request(
            path,
            RequestOptions::new(Method::GET).query(query).bearer(bearer),
        )
        .await
    }

    pub async fn post(
        &self,
        path: &str,
        body: Value,
        bearer: Option<String>,
    ) -> Result<Body, ApiError> {
        self.request(
            path,
            RequestOptions::new(Method::POST).json(body).bearer(bearer),
        )
        .await
    }

    pub async fn put(
        &self,
        path: &str,
        body: Value,
        bearer: Option<String>,
    ) -> Result<Body, ApiError> {
        self.request(
            path,
            RequestOptions::new(Method::PUT).json(body).bearer(bearer),
        )
        .await
    }

    pub async fn delete(&self, path: &str, bearer: Option<String>) -> Result<Body, ApiError> {
        self.request(path, RequestOptions::new(Method::DELETE).bearer(bearer))
            .await
    }

    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Body, ApiError> {
        let url = self.url(path);
        debug!("{} {url}", options.method);

        let mut request = self
            .client
            .request(options.method.clone(), &url)
            .headers(merge_headers(&options));
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.body {
            let payload = serde_json::to_string(body).map_err(ApiError::decode)?;
            request = request.body(payload);
        }
        self.execute(&options.method, &url, request).await
    }

    /// Multipart POST. The form sets its own content type with the boundary,
    /// so the JSON default is not applied here.
    pub async fn post_multipart(
        &self,
        path: &str,
        query: &[(&str, String)],
        form: Form,
        bearer: Option<String>,
    ) -> Result<Body, ApiError> {
        let url = self.url(path);
        debug!("POST {url} (multipart)");

        let mut request = self.client.post(&url).multipart(form);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        self.execute(&Method::POST, &url, request).await
    }

    async fn execute(
        &self,
        method: &Method,
        url: &str,
        request: RequestBuilder,
    ) -> Result<Body, ApiError> {
        let response = request.send().await.map_err(|err| {
            warn!("{method} {url} failed: {err}");
            ApiError::Network(err.to_string())
        })?;

        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains("application/json"));
        let text = response.text().await.map_err(ApiError::from)?;

        if !status.is_success() {
            let message = error_message(status, &text);
            warn!("{method} {url} returned {status}: {message}");
            return Err(ApiError::http(status, message));
        }

        if is_json {
            serde_json::from_str(&text)
                .map(Body::Json)
                .map_err(ApiError::decode)
        } else {
            Ok(Body::Text(text))
        }
    }
}

/// Default JSON content type first, then caller headers so they win.
fn merge_headers(options: &RequestOptions) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(token) = &options.bearer {
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {token}")) {
            headers.insert(AUTHORIZATION, value);
        }
    }
    for (name, value) in &options.headers {
        headers.insert(name.clone(), value.clone());
    }
    headers
}

/// Backend failure bodies carry `detail` (or sometimes `message`).
fn error_message(status: StatusCode, text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|value| {
            ["detail", "message"].iter().find_map(|key| {
                value
                    .get(*key)
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
        })
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()))
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_with_single_slash() {
        let client = HttpClient::new(&ClientConfig::new("http://localhost:8000/")).unwrap();
        assert_eq!(client.url("/auth/login"), "http://localhost:8000/auth/login");
        assert_eq!(client.url("ml/status"), "http://localhost:8000/ml/status");
    }

    #[test]
    fn caller_headers_override_defaults() {
        let options = RequestOptions::new(Method::POST)
            .bearer(Some("abc".to_string()))
            .header(CONTENT_TYPE, HeaderValue::from_static("text/csv"));
        let headers = merge_headers(&options);
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/csv");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
    }

    #[test]
    fn error_message_prefers_detail() {
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, r#"{"detail":"boom"}"#),
            "boom"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message":"bad input"}"#),
            "bad input"
        );
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, "<html>"),
            "HTTP error! status: 502"
        );
    }

    #[test]
    fn text_body_does_not_decode_as_json() {
        let err = Body::Text("ok".to_string()).json::<Value>().unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
