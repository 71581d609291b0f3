use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{error::GeolocationError, model::Coordinates};

use super::Geolocator;

/// Approximate position from an ip-api.com compatible lookup endpoint.
#[derive(Debug, Clone)]
pub struct IpLocator {
    url: String,
    http: Client,
}

impl IpLocator {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            http: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: Option<String>,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpLookupResponse {
    fn into_coordinates(self) -> Result<Coordinates, GeolocationError> {
        if self.status.as_deref() == Some("fail") {
            return Err(GeolocationError::Platform(
                self.message.unwrap_or_else(|| "Position lookup failed".to_string()),
            ));
        }

        match (self.lat, self.lon) {
            (Some(latitude), Some(longitude)) => Ok(Coordinates { latitude, longitude }),
            _ => Err(GeolocationError::Platform(
                "Position unavailable".to_string(),
            )),
        }
    }
}

#[async_trait]
impl Geolocator for IpLocator {
    async fn request_position(&self) -> Result<Coordinates, GeolocationError> {
        debug!(url = %self.url, "looking up position");

        let res = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|err| GeolocationError::Platform(err.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            return Err(GeolocationError::Platform(format!(
                "Position lookup failed with status {status}"
            )));
        }

        let parsed: IpLookupResponse = res
            .json()
            .await
            .map_err(|err| GeolocationError::Platform(err.to_string()))?;

        parsed.into_coordinates()
    }
}
