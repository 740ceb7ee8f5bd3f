//! # Error Types
//!
//! Sources fail with [`SourceError`]; the fallback chains in [`crate::sources`]
//! catch these and move on to the next source, so they rarely reach a caller.
//!
//! [`DataQualityDefect`] describes inputs that are well typed but degenerate.
//! The core repairs them and logs the defect; it is never returned.

use crate::SiteTime;
use thiserror::Error;

/// Failure of a weather or tide source.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The source answered with something unusable, described in words
    #[error("{source_name} unavailable: {reason}")]
    SourceUnavailable {
        source_name: &'static str,
        reason: String,
    },

    /// Network failure, timeout, or a non-success HTTP status
    #[error("{source_name} request failed: {source}")]
    Http {
        source_name: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The body was not the JSON the source expects
    #[error("{source_name} sent an unreadable payload: {source}")]
    Decode {
        source_name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The provider answered but the payload held no usable samples
    #[error("{source_name} returned no usable samples")]
    EmptyData { source_name: &'static str },

    /// A required credential is not configured
    #[error("{source_name} is missing configuration: {key}")]
    ConfigurationMissing {
        source_name: &'static str,
        key: &'static str,
    },
}

impl SourceError {
    pub fn unavailable(source_name: &'static str, reason: impl std::fmt::Display) -> Self {
        SourceError::SourceUnavailable {
            source_name,
            reason: reason.to_string(),
        }
    }

    /// Adapter for `map_err` on `reqwest` results.
    pub fn http(source_name: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| SourceError::Http {
            source_name,
            source,
        }
    }

    /// Decode a JSON body, keeping the parser error as the cause.
    pub fn decode_json<T: serde::de::DeserializeOwned>(
        source_name: &'static str,
        body: &[u8],
    ) -> Result<T, Self> {
        serde_json::from_slice(body).map_err(|source| SourceError::Decode {
            source_name,
            source,
        })
    }
}

/// Degenerate but well-typed input the core repaired instead of rejecting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataQualityDefect {
    /// An extremum at one end of the bracket shares its timestamp with
    /// another, so the bracket has no single height to start from
    #[error("tide extrema bracketing {target} share timestamp {at}")]
    DuplicateTideTimestamp { at: SiteTime, target: SiteTime },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_messages_name_the_source() {
        let err = SourceError::unavailable("openweathermap", "status 503");
        assert_eq!(err.to_string(), "openweathermap unavailable: status 503");

        let err = SourceError::EmptyData { source_name: "niwa" };
        assert_eq!(err.to_string(), "niwa returned no usable samples");

        let err = SourceError::ConfigurationMissing {
            source_name: "niwa",
            key: "NIWA_API_KEY",
        };
        assert!(err.to_string().contains("NIWA_API_KEY"));
    }

    #[test]
    fn test_decode_failure_keeps_parser_error() {
        #[derive(Debug, serde::Deserialize)]
        struct Body {
            values: Vec<f64>,
        }

        let err = SourceError::decode_json::<Body>("niwa", b"{\"values\": [1.0,").unwrap_err();
        assert!(matches!(err, SourceError::Decode { source_name: "niwa", .. }));
        let cause = std::error::Error::source(&err).unwrap();
        assert!(cause.downcast_ref::<serde_json::Error>().is_some());
        assert!(err.to_string().starts_with("niwa sent an unreadable payload: "));

        let ok: Body = SourceError::decode_json("niwa", b"{\"values\": [1.0]}").unwrap();
        assert_eq!(ok.values, vec![1.0]);
    }

    #[tokio::test]
    async fn test_http_failure_keeps_reqwest_error() {
        // an unparsable URL fails inside reqwest before any connection is made
        let err = reqwest::Client::new()
            .get("not a url")
            .send()
            .await
            .map_err(SourceError::http("openweathermap"))
            .unwrap_err();
        assert!(matches!(
            err,
            SourceError::Http {
                source_name: "openweathermap",
                ..
            }
        ));
        let cause = std::error::Error::source(&err).unwrap();
        assert!(cause.downcast_ref::<reqwest::Error>().is_some());
    }
}
