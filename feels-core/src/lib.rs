//! Core library for the `feels` weather dashboard client.
//!
//! This crate defines:
//! - Configuration and the persisted session credential
//! - The HTTP client for the weather feels backend
//! - Geolocation sources
//! - Session, survey, weather and nearby-score state, and the flow tying them together
//!
//! It is used by `feels-cli`, but can also drive other front ends.

pub mod api;
pub mod config;
pub mod credential;
pub mod dashboard;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod nearby;
pub mod session;
pub mod survey;
pub mod view;
pub mod weather;

pub use api::ApiClient;
pub use config::{Config, LocationConfig};
pub use credential::{Credential, CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use dashboard::{Dashboard, Screen};
pub use error::{ApiError, GeolocationError, LocationError, SessionError, SurveyError};
pub use geolocation::{Geolocator, LocationSource};
pub use model::{Coordinates, FeelingScore, NearbyScore, WeatherAverages, WeatherSnapshot};
pub use nearby::NearbyView;
pub use session::{Session, SessionController};
pub use survey::{Survey, SurveyState};
pub use weather::WeatherView;
