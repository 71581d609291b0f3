use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use tracing::warn;

use crate::{
    Config,
    api::ApiClient,
    error::{GeolocationError, LocationError},
    geolocation::{fixed::FixedLocator, ip::IpLocator},
    model::Coordinates,
};

pub mod fixed;
pub mod ip;

/// Where a position comes from. Stored lowercase in the `[location]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    /// Coordinates written in the config file.
    Fixed,
    /// Approximate position from an IP lookup service.
    Ip,
    /// The user refused to share a position.
    Denied,
}

impl LocationSource {
    pub const ALL: [LocationSource; 3] =
        [LocationSource::Fixed, LocationSource::Ip, LocationSource::Denied];
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LocationSource::Fixed => "Fixed coordinates",
            LocationSource::Ip => "IP lookup",
            LocationSource::Denied => "Never share my position",
        };
        f.write_str(label)
    }
}

/// One-shot position query. No retry; callers re-invoke to try again.
#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn request_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// Locator that never yields a position.
#[derive(Debug, Clone, Copy)]
pub struct Unavailable {
    denied: bool,
}

impl Unavailable {
    pub fn unsupported() -> Self {
        Self { denied: false }
    }

    pub fn denied() -> Self {
        Self { denied: true }
    }
}

#[async_trait]
impl Geolocator for Unavailable {
    async fn request_position(&self) -> Result<Coordinates, GeolocationError> {
        if self.denied {
            Err(GeolocationError::PermissionDenied)
        } else {
            Err(GeolocationError::Unsupported)
        }
    }
}

/// Construct the configured locator. No source configured means geolocation is unsupported.
pub fn locator_from_config(config: &Config) -> anyhow::Result<Box<dyn Geolocator>> {
    let boxed: Box<dyn Geolocator> = match config.location.source {
        None => Box::new(Unavailable::unsupported()),
        Some(LocationSource::Denied) => Box::new(Unavailable::denied()),
        Some(LocationSource::Fixed) => {
            let coords = config.fixed_location().ok_or_else(|| {
                anyhow::anyhow!(
                    "Location source 'fixed' has no coordinates.\n\
                     Hint: run `feels configure` and enter a latitude and longitude."
                )
            })?;
            Box::new(FixedLocator::new(coords))
        }
        Some(LocationSource::Ip) => Box::new(IpLocator::new(config.lookup_url())),
    };

    Ok(boxed)
}

/// Capture the current position and report it to the backend.
///
/// A failed report does not undo the capture; it surfaces as
/// [`LocationError::Update`].
pub async fn report_position(
    locator: &dyn Geolocator,
    api: &ApiClient,
) -> Result<Coordinates, LocationError> {
    if !api.session().is_authenticated() {
        return Err(LocationError::NotAuthenticated);
    }

    let coords = locator.request_position().await?;

    api.update_location(coords).await.map_err(|source| {
        warn!(error = %source, "failed to update location");
        LocationError::Update { coords, source }
    })?;

    Ok(coords)
}
