use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt};

/// Kilometres per degree, used to turn the backend's planar degree distance
/// into an approximate ground distance.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Shown when a snapshot does not carry a city name.
pub const FALLBACK_CITY: &str = "Latest City";

/// Aggregated readings the backend averages across its data sources.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherAverages {
    pub temperature: f64,
    pub humidity: f64,
    pub feels_like: f64,
    pub wind_speed: f64,
}

/// One weather reading for a city. Replaced wholesale on every fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(default)]
    pub city: Option<String>,
    pub average: WeatherAverages,
}

impl WeatherSnapshot {
    pub fn city_name(&self) -> &str {
        self.city.as_deref().filter(|c| !c.is_empty()).unwrap_or(FALLBACK_CITY)
    }
}

/// Body of `GET /weather/coordinates`.
#[derive(Debug, Clone, Deserialize)]
pub struct CoordinatesWeather {
    #[serde(default)]
    pub city: Option<String>,
    pub weather: WeatherSnapshot,
}

impl CoordinatesWeather {
    /// Flatten into a snapshot, letting the outer city name fill a missing inner one.
    pub fn into_snapshot(self) -> WeatherSnapshot {
        let mut snapshot = self.weather;
        if snapshot.city.is_none() {
            snapshot.city = self.city;
        }
        snapshot
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Subjective rating of the current weather, 1 (freezing) to 5 (hot).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub struct FeelingScore(u8);

impl FeelingScore {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub const fn all() -> [FeelingScore; 5] {
        [FeelingScore(1), FeelingScore(2), FeelingScore(3), FeelingScore(4), FeelingScore(5)]
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Freezing Cold",
            2 => "Slightly Cold",
            3 => "Cool",
            4 => "Warm",
            _ => "Hot",
        }
    }

    /// Label for a raw score coming back from the server, which is not range checked.
    pub fn describe(raw: i64) -> &'static str {
        FeelingScore::try_from(raw).map(FeelingScore::label).unwrap_or("Unknown")
    }
}

impl From<FeelingScore> for u8 {
    fn from(score: FeelingScore) -> Self {
        score.0
    }
}

impl TryFrom<i64> for FeelingScore {
    type Error = anyhow::Error;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(FeelingScore(value as u8))
        } else {
            Err(anyhow::anyhow!(
                "Feeling score {value} is out of range. Expected {}..={}.",
                Self::MIN,
                Self::MAX
            ))
        }
    }
}

impl fmt::Display for FeelingScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Another user's rating together with how far away they are.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct NearbyScore {
    pub feeling_score: i64,
    /// Planar distance in degrees as computed by the backend.
    pub distance: f64,
}

impl NearbyScore {
    pub fn distance_km(&self) -> f64 {
        self.distance * KM_PER_DEGREE
    }

    pub fn feeling_label(&self) -> &'static str {
        FeelingScore::describe(self.feeling_score)
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct Registration<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct FeelingUpdate {
    pub feeling_score: FeelingScore,
}
