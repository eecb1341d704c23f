//! HTTP probe driven by the bundled k6 probe script
//!
//! All preconditions are checked before a process is spawned; the request
//! itself is described to the script through `CHAOS_K6_*` variables.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::config::{K6Config, PROBE_SCRIPT};
use crate::driver::K6;
use crate::error::{K6Error, K6Result};
use crate::traits::ProcessRunner;
use shared::{component_debug, Component};

pub const METHOD_VAR: &str = "CHAOS_K6_METHOD";
pub const STATUS_VAR: &str = "CHAOS_K6_STATUS";
pub const BODY_VAR: &str = "CHAOS_K6_BODY";
pub const HEADERS_VAR: &str = "CHAOS_K6_HEADERS";
pub const VUS_VAR: &str = "CHAOS_K6_VUS";
pub const DURATION_VAR: &str = "CHAOS_K6_DURATION";
pub const HTTP_TIMEOUT_VAR: &str = "CHAOS_K6_HTTP_TIMEOUT";

/// HTTP request methods the probe script can issue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = K6Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "OPTIONS" => Ok(HttpMethod::Options),
            _ => Err(K6Error::InvalidMethod {
                method: s.to_string(),
            }),
        }
    }
}

/// Inputs of the `http` probe, as loosely typed as a caller may send them
#[derive(Clone, Debug, PartialEq)]
pub struct HttpProbe {
    pub endpoint: String,
    pub method: String,
    pub status: u16,
    pub body: String,
    pub headers: Map<String, Value>,
    pub vus: u32,
    /// Empty lets the script run a single iteration
    pub duration: String,
    /// Per-request timeout in seconds
    pub timeout: u32,
    pub debug: bool,
}

impl Default for HttpProbe {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            method: HttpMethod::Get.to_string(),
            status: 200,
            body: String::new(),
            headers: Map::new(),
            vus: 1,
            duration: String::new(),
            timeout: 1,
            debug: false,
        }
    }
}

impl HttpProbe {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Check status, method and endpoint in that order
    pub fn validate(&self) -> K6Result<HttpMethod> {
        if !(100..=999).contains(&self.status) {
            return Err(K6Error::InvalidStatus {
                status: self.status,
            });
        }
        let method = self.method.parse::<HttpMethod>()?;
        if self.endpoint.trim().is_empty() {
            return Err(K6Error::MissingEndpoint);
        }
        Ok(method)
    }

    /// Variables consumed by the probe script
    pub fn environ(&self, method: HttpMethod) -> K6Result<BTreeMap<String, String>> {
        Ok(BTreeMap::from([
            (crate::actions::URL_VAR.to_string(), self.endpoint.clone()),
            (METHOD_VAR.to_string(), method.to_string()),
            (STATUS_VAR.to_string(), self.status.to_string()),
            (BODY_VAR.to_string(), self.body.clone()),
            (HEADERS_VAR.to_string(), serde_json::to_string(&self.headers)?),
            (VUS_VAR.to_string(), self.vus.to_string()),
            (DURATION_VAR.to_string(), self.duration.clone()),
            (HTTP_TIMEOUT_VAR.to_string(), self.timeout.to_string()),
        ]))
    }
}

/// Probe an endpoint and report whether it answered with the expected status.
///
/// Depending on the endpoint and payload this may be destructive.
pub async fn http(runner: &dyn ProcessRunner, config: &K6Config, probe: &HttpProbe) -> K6Result<bool> {
    let method = probe.validate()?;
    component_debug!(
        Component::K6Driver,
        "Probing {} {} expecting {}",
        method,
        probe.endpoint,
        probe.status
    );

    let driver = K6::new(config)
        .with_debug(probe.debug)
        .with_environ(probe.environ(method)?);

    driver.run_script(runner, &config.script_path(PROBE_SCRIPT)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing_is_case_insensitive() {
        assert_eq!("post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert_eq!("Options".parse::<HttpMethod>().unwrap(), HttpMethod::Options);
        assert!(matches!(
            "FOO".parse::<HttpMethod>(),
            Err(K6Error::InvalidMethod { method }) if method == "FOO"
        ));
        assert!("HEAD".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_validation_order() {
        let probe = HttpProbe {
            status: 1000,
            method: "FOO".into(),
            ..HttpProbe::default()
        };
        assert!(matches!(probe.validate(), Err(K6Error::InvalidStatus { status: 1000 })));

        let probe = HttpProbe {
            method: "FOO".into(),
            ..HttpProbe::default()
        };
        assert!(matches!(probe.validate(), Err(K6Error::InvalidMethod { .. })));

        assert!(matches!(HttpProbe::default().validate(), Err(K6Error::MissingEndpoint)));
    }

    #[test]
    fn test_status_bounds() {
        let probe = |status| HttpProbe {
            status,
            ..HttpProbe::new("http://localhost")
        };
        assert!(probe(99).validate().is_err());
        assert!(probe(100).validate().is_ok());
        assert!(probe(999).validate().is_ok());
        assert!(probe(1000).validate().is_err());
    }

    #[test]
    fn test_headers_serialized_as_json() {
        let mut probe = HttpProbe::new("http://localhost");
        probe
            .headers
            .insert("Content-Type".into(), Value::String("application/json".into()));

        let env = probe.environ(HttpMethod::Get).unwrap();
        assert_eq!(env[HEADERS_VAR], r#"{"Content-Type":"application/json"}"#);
        assert_eq!(env[METHOD_VAR], "GET");
    }
}
