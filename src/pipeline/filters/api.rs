use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::borrow::Cow;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::data_model::Verdict;
use crate::error::{PipelineError, Result};
use crate::executor::Filter;

use super::mode::filter_mode;

filter_mode! {
    /// How the text is sent to the API.
    pub enum ApiMethod for "Api method" {
        /// Payload fields as query parameters.
        Get => "get",
        /// Payload as a JSON body.
        #[default]
        Post => "post",
    }
}

pub const DEFAULT_TIMEOUT_SECS: f64 = 3.0;

/// Turns the text into the request payload.
pub type PayloadFn = Box<dyn Fn(&str) -> Value + Send + Sync>;

/// Turns the JSON response into `(accepted, replacement text)`.
pub type InterpretFn = Box<dyn Fn(&Value) -> Result<(bool, Option<String>)> + Send + Sync>;

/// Reads the verdict out of a JSON response with JSON pointers (RFC 6901).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponsePointers {
    /// Pointer to a boolean that is `true` when the text is acceptable.
    pub verdict: String,
    /// Treat the boolean as "is spam" instead.
    pub invert: bool,
    /// Optional pointer to a string that replaces the text.
    pub text: Option<String>,
}

impl Default for ResponsePointers {
    fn default() -> Self {
        ResponsePointers {
            verdict: "/passed".to_string(),
            invert: false,
            text: None,
        }
    }
}

impl ResponsePointers {
    pub fn interpret(&self, response: &Value) -> Result<(bool, Option<String>)> {
        let flag = response
            .pointer(&self.verdict)
            .and_then(Value::as_bool)
            .ok_or_else(|| invalid_response(format!("no boolean at '{}'", self.verdict)))?;

        let text = match &self.text {
            Some(pointer) => Some(
                response
                    .pointer(pointer)
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| invalid_response(format!("no string at '{}'", pointer)))?,
            ),
            None => None,
        };

        Ok((flag != self.invert, text))
    }
}

fn invalid_response(reason: String) -> PipelineError {
    PipelineError::InvalidResponse {
        filter: "ApiFilter".to_string(),
        reason,
    }
}

/// Delegates the decision to a JSON HTTP API.
///
/// Every check performs one blocking request, so this filter belongs at the
/// end of a pipeline where cheaper filters have already had their say.
pub struct ApiFilter {
    client: Client,
    url: String,
    method: ApiMethod,
    headers: HeaderMap,
    payload: PayloadFn,
    interpreter: InterpretFn,
}

impl ApiFilter {
    pub fn builder(url: impl Into<String>) -> ApiFilterBuilder {
        ApiFilterBuilder {
            url: url.into(),
            method: ApiMethod::default(),
            headers: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            payload: None,
            interpreter: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn method(&self) -> ApiMethod {
        self.method
    }
}

impl fmt::Debug for ApiFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiFilter")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("headers", &self.headers.len())
            .finish_non_exhaustive()
    }
}

impl Filter for ApiFilter {
    fn name(&self) -> &'static str {
        "ApiFilter"
    }

    fn check<'a>(&self, text: &'a str) -> Result<Verdict<'a>> {
        let payload = (self.payload)(text);
        let request = match self.method {
            ApiMethod::Get => self.client.get(&self.url).query(&payload),
            ApiMethod::Post => self.client.post(&self.url).json(&payload),
        };

        let response = request
            .headers(self.headers.clone())
            .send()?
            .error_for_status()?;
        let body = response.text()?;
        let json: Value = serde_json::from_str(&body)
            .map_err(|e| invalid_response(format!("response is not valid JSON: {}", e)))?;
        debug!(url = %self.url, response = %json, "API filter response");

        let (accepted, replacement) = (self.interpreter)(&json)?;
        let text = match replacement {
            Some(replacement) if replacement != text => Cow::Owned(replacement),
            _ => Cow::Borrowed(text),
        };
        Ok(Verdict::new(accepted, text))
    }
}

pub struct ApiFilterBuilder {
    url: String,
    method: ApiMethod,
    headers: Vec<(String, String)>,
    timeout_secs: f64,
    payload: Option<PayloadFn>,
    interpreter: Option<InterpretFn>,
}

impl ApiFilterBuilder {
    pub fn method(mut self, method: ApiMethod) -> Self {
        self.method = method;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout_secs(mut self, secs: f64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Defaults to `{"text": <text>}`.
    pub fn payload<F>(mut self, payload: F) -> Self
    where
        F: Fn(&str) -> Value + Send + Sync + 'static,
    {
        self.payload = Some(Box::new(payload));
        self
    }

    pub fn interpreter<F>(mut self, interpreter: F) -> Self
    where
        F: Fn(&Value) -> Result<(bool, Option<String>)> + Send + Sync + 'static,
    {
        self.interpreter = Some(Box::new(interpreter));
        self
    }

    /// Defaults to [`ResponsePointers::default`].
    pub fn pointers(self, pointers: ResponsePointers) -> Self {
        self.interpreter(move |response| pointers.interpret(response))
    }

    pub fn build(self) -> Result<ApiFilter> {
        if !(self.timeout_secs.is_finite() && self.timeout_secs > 0.0) {
            return Err(PipelineError::ConfigValidationError(format!(
                "ApiFilter: timeout must be a positive number of seconds, got {}",
                self.timeout_secs
            )));
        }
        reqwest::Url::parse(&self.url).map_err(|e| {
            PipelineError::ConfigValidationError(format!(
                "ApiFilter: invalid url '{}': {}",
                self.url, e
            ))
        })?;

        let mut headers = HeaderMap::new();
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                PipelineError::ConfigValidationError(format!(
                    "ApiFilter: invalid header name '{}': {}",
                    name, e
                ))
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| {
                PipelineError::ConfigValidationError(format!(
                    "ApiFilter: invalid value for header '{}': {}",
                    name, e
                ))
            })?;
            headers.insert(header_name, header_value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs_f64(self.timeout_secs))
            .build()?;

        let payload = match self.payload {
            Some(payload) => payload,
            None => Box::new(|text: &str| json!({ "text": text })) as PayloadFn,
        };
        let interpreter = match self.interpreter {
            Some(interpreter) => interpreter,
            None => {
                let pointers = ResponsePointers::default();
                Box::new(move |response: &Value| pointers.interpret(response)) as InterpretFn
            }
        };

        Ok(ApiFilter {
            client,
            url: self.url,
            method: self.method,
            headers,
            payload,
            interpreter,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_interpretation() {
        let pointers = ResponsePointers::default();
        assert_eq!(
            pointers.interpret(&json!({"passed": true})).unwrap(),
            (true, None)
        );

        let pointers = ResponsePointers {
            verdict: "/result/is_spam".to_string(),
            invert: true,
            text: Some("/result/clean".to_string()),
        };
        let response = json!({"result": {"is_spam": true, "clean": "fine"}});
        assert_eq!(
            pointers.interpret(&response).unwrap(),
            (false, Some("fine".to_string()))
        );
    }

    #[test]
    fn test_pointer_interpretation_missing_fields() {
        let pointers = ResponsePointers::default();
        match pointers.interpret(&json!({"passed": "yes"})) {
            Err(PipelineError::InvalidResponse { filter, .. }) => assert_eq!(filter, "ApiFilter"),
            other => panic!("Expected InvalidResponse, got {:?}", other),
        }
    }

    #[test]
    fn test_builder_validation() {
        assert!(ApiFilter::builder("http://localhost:1/check")
            .timeout_secs(0.0)
            .build()
            .is_err());
        assert!(ApiFilter::builder("not a url").build().is_err());
        assert!(ApiFilter::builder("http://localhost:1/check")
            .header("bad header", "x")
            .build()
            .is_err());
        let filter = ApiFilter::builder("http://localhost:1/check")
            .method(ApiMethod::Get)
            .header("X-Api-Key", "secret")
            .build()
            .unwrap();
        assert_eq!(filter.method(), ApiMethod::Get);
    }
}
