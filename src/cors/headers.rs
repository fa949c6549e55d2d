//! Static CORS response headers.
//!
//! Everything except `Access-Control-Allow-Origin` is independent of the
//! request, so the values are rendered once at construction. An empty list,
//! `false` or a zero max-age omits the header entirely.

use axum::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::config::CorsConfig;
use crate::cors::error::CorsError;

/// Pre-rendered static header values.
#[derive(Debug, Clone, Default)]
pub struct StaticCorsHeaders {
    allow_methods: Option<HeaderValue>,
    allow_headers: Option<HeaderValue>,
    expose_headers: Option<HeaderValue>,
    allow_credentials: bool,
    max_age: Option<HeaderValue>,
}

impl StaticCorsHeaders {
    pub fn from_config(config: &CorsConfig) -> Result<Self, CorsError> {
        Ok(Self {
            allow_methods: join_list(&config.allow_methods, "Access-Control-Allow-Methods")?,
            allow_headers: join_list(&config.allow_headers, "Access-Control-Allow-Headers")?,
            expose_headers: join_list(&config.expose_headers, "Access-Control-Expose-Headers")?,
            allow_credentials: config.allow_credentials,
            max_age: (config.max_age > 0).then(|| HeaderValue::from(config.max_age)),
        })
    }

    fn pairs(&self) -> impl Iterator<Item = (HeaderName, HeaderValue)> + '_ {
        let credentials = self
            .allow_credentials
            .then(|| HeaderValue::from_static("true"));

        [
            (ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone()),
            (ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone()),
            (ACCESS_CONTROL_EXPOSE_HEADERS, self.expose_headers.clone()),
            (ACCESS_CONTROL_ALLOW_CREDENTIALS, credentials),
            (ACCESS_CONTROL_MAX_AGE, self.max_age.clone()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
    }

    /// Set every configured header, replacing existing values.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in self.pairs() {
            headers.insert(name, value);
        }
    }

    /// Set configured headers the response does not already carry.
    pub fn apply_missing(&self, headers: &mut HeaderMap) {
        for (name, value) in self.pairs() {
            headers.entry(name).or_insert(value);
        }
    }
}

fn join_list(values: &[String], header: &'static str) -> Result<Option<HeaderValue>, CorsError> {
    if values.is_empty() {
        return Ok(None);
    }

    let joined = values.join(", ");
    HeaderValue::from_str(&joined)
        .map(Some)
        .map_err(|_| CorsError::InvalidHeaderValue {
            header,
            value: joined,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_render() {
        let headers = StaticCorsHeaders::from_config(&CorsConfig::default()).unwrap();
        let mut map = HeaderMap::new();
        headers.apply(&mut map);

        assert_eq!(map[ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, PUT, DELETE, OPTIONS");
        assert_eq!(
            map[ACCESS_CONTROL_ALLOW_HEADERS],
            "Origin, Content-Type, Accept, Authorization"
        );
        assert_eq!(map[ACCESS_CONTROL_MAX_AGE], "86400");
        assert!(map.get(ACCESS_CONTROL_EXPOSE_HEADERS).is_none());
        assert!(map.get(ACCESS_CONTROL_ALLOW_CREDENTIALS).is_none());
    }

    #[test]
    fn test_empty_values_are_omitted() {
        let config = CorsConfig {
            allow_methods: vec![],
            allow_headers: vec![],
            expose_headers: vec![],
            allow_credentials: false,
            max_age: 0,
            ..CorsConfig::default()
        };
        let headers = StaticCorsHeaders::from_config(&config).unwrap();
        let mut map = HeaderMap::new();
        headers.apply(&mut map);
        assert!(map.is_empty());
    }

    #[test]
    fn test_credentials_and_expose() {
        let config = CorsConfig {
            expose_headers: vec!["X-Total-Count".into(), "X-Request-Id".into()],
            allow_credentials: true,
            ..CorsConfig::default()
        };
        let headers = StaticCorsHeaders::from_config(&config).unwrap();
        let mut map = HeaderMap::new();
        headers.apply(&mut map);
        assert_eq!(map[ACCESS_CONTROL_EXPOSE_HEADERS], "X-Total-Count, X-Request-Id");
        assert_eq!(map[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[test]
    fn test_apply_missing_keeps_existing() {
        let headers = StaticCorsHeaders::from_config(&CorsConfig::default()).unwrap();
        let mut map = HeaderMap::new();
        map.insert(ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("60"));
        headers.apply_missing(&mut map);
        assert_eq!(map[ACCESS_CONTROL_MAX_AGE], "60");
        assert_eq!(map[ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, PUT, DELETE, OPTIONS");
    }

    #[test]
    fn test_invalid_value_rejected() {
        let config = CorsConfig {
            allow_headers: vec!["X-Bad\nHeader".into()],
            ..CorsConfig::default()
        };
        let err = StaticCorsHeaders::from_config(&config).unwrap_err();
        assert!(matches!(
            err,
            CorsError::InvalidHeaderValue { header: "Access-Control-Allow-Headers", .. }
        ));
    }
}
