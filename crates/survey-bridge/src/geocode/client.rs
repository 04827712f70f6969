use super::{GeocodeError, GeocodeResult, MapitResponse, PostcodeLookup};
use crate::config::MapitConfig;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const API_KEY_HEADER: &str = "X-Api-Key";

/// MapIt postcode client. One GET per lookup, no retries.
#[derive(Debug, Clone)]
pub struct MapitClient {
    http: Client,
    base_url: Url,
    generation: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl MapitClient {
    pub fn new(config: &MapitConfig) -> Result<Self, GeocodeError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(GeocodeError::Transport)?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            generation: config.generation.clone(),
            api_key: config.api_key.clone(),
            timeout: config.timeout,
        })
    }

    /// `{base}/postcode/{postcode}?generation={generation}` with the postcode
    /// percent-encoded as a single path segment.
    pub fn postcode_url(&self, postcode: &str) -> Result<Url, GeocodeError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GeocodeError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("postcode")
            .push(postcode);
        url.query_pairs_mut()
            .clear()
            .append_pair("generation", &self.generation);
        Ok(url)
    }

    fn transport_error(&self, err: reqwest::Error) -> GeocodeError {
        if err.is_timeout() {
            GeocodeError::Timeout(self.timeout)
        } else {
            GeocodeError::Transport(err)
        }
    }
}

impl PostcodeLookup for MapitClient {
    async fn lookup(&self, postcode: &str) -> Result<GeocodeResult, GeocodeError> {
        let url = self.postcode_url(postcode)?;
        debug!(%postcode, "querying postcode service");

        let mut request = self.http.get(url);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await.map_err(|err| {
            warn!(%postcode, %err, "postcode service request failed");
            self.transport_error(err)
        })?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(%postcode, %status, "postcode service rejected credentials");
            return Err(GeocodeError::Status {
                status: status.as_u16(),
            });
        }
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            warn!(%postcode, %status, "postcode service unavailable");
            return Err(GeocodeError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(err))?;
        let parsed: MapitResponse = serde_json::from_slice(&body).map_err(|err| {
            warn!(%postcode, %status, %err, "postcode service returned non-JSON body");
            GeocodeError::Decode(err)
        })?;

        let result = parsed.to_geocode();
        if result.is_empty() {
            debug!(%postcode, %status, "postcode not placed in any known area");
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> MapitClient {
        MapitClient::new(&MapitConfig {
            base_url: Url::parse(base).expect("valid base url"),
            generation: "41".to_string(),
            api_key: None,
            timeout: Duration::from_secs(5),
        })
        .expect("client builds")
    }

    #[test]
    fn escapes_postcode_into_a_single_segment() {
        let url = client("https://mapit.mysociety.org")
            .postcode_url("SW1A 1AA")
            .expect("url builds");
        assert_eq!(
            url.as_str(),
            "https://mapit.mysociety.org/postcode/SW1A%201AA?generation=41"
        );

        let url = client("https://mapit.mysociety.org/")
            .postcode_url("AB1/2CD")
            .expect("url builds");
        assert_eq!(
            url.as_str(),
            "https://mapit.mysociety.org/postcode/AB1%2F2CD?generation=41"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let url = client("http://127.0.0.1:8080/mapit/")
            .postcode_url("EH1 1YZ")
            .expect("url builds");
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:8080/mapit/postcode/EH1%201YZ?generation=41"
        );
    }
}
