use parking_lot::Mutex;
use std::fmt::Write;

use crate::{
    api::ApiClient,
    error::ApiError,
    model::WeatherSnapshot,
    view::{Status, ViewState},
};

pub const FETCH_WEATHER_FAILED: &str = "Failed to fetch weather data";
pub const FETCH_INITIAL_WEATHER_FAILED: &str = "Failed to fetch initial weather data";

/// Current weather for a searched city or the user's own position.
#[derive(Debug, Default)]
pub struct WeatherView {
    state: Mutex<ViewState<WeatherSnapshot>>,
}

impl WeatherView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fetch_by_city(
        &self,
        api: &ApiClient,
        city: &str,
    ) -> Result<WeatherSnapshot, ApiError> {
        self.track(FETCH_WEATHER_FAILED, api.weather_by_city(city)).await
    }

    pub async fn fetch_by_coordinates(&self, api: &ApiClient) -> Result<WeatherSnapshot, ApiError> {
        self.track(FETCH_WEATHER_FAILED, api.weather_by_coordinates()).await
    }

    pub async fn fetch_initial(&self, api: &ApiClient) -> Result<WeatherSnapshot, ApiError> {
        self.track(FETCH_INITIAL_WEATHER_FAILED, api.initial_weather()).await
    }

    async fn track<F>(&self, failure: &str, request: F) -> Result<WeatherSnapshot, ApiError>
    where
        F: Future<Output = Result<WeatherSnapshot, ApiError>>,
    {
        let ticket = self.state.lock().begin();
        let outcome = request.await;

        let settled = match &outcome {
            Ok(snapshot) => Ok(snapshot.clone()),
            Err(err) => {
                tracing::warn!(error = %err, "{failure}");
                Err(failure.to_string())
            }
        };
        self.state.lock().settle(ticket, settled);

        outcome
    }

    pub fn snapshot(&self) -> Option<WeatherSnapshot> {
        self.state.lock().data().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().is_loading()
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().error().map(str::to_owned)
    }

    pub fn clear(&self) {
        self.state.lock().reset();
    }

    /// Status line, then the four metrics when a snapshot is present.
    pub fn render(&self) -> String {
        let state = self.state.lock();
        let mut out = String::new();

        match state.status() {
            Status::Loading => out.push_str("Loading...\n"),
            Status::Failed(message) => {
                let _ = writeln!(out, "{message}");
            }
            Status::Idle => {}
        }

        if let Some(snapshot) = state.data() {
            out.push_str(&render_snapshot(snapshot));
        }

        out
    }
}

pub fn render_snapshot(snapshot: &WeatherSnapshot) -> String {
    let avg = &snapshot.average;
    format!(
        "Weather in {}\n  Temperature: {}\n  Humidity: {}\n  Feels Like: {}\n  Wind Speed: {}\n",
        snapshot.city_name(),
        avg.temperature,
        avg.humidity,
        avg.feels_like,
        avg.wind_speed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WeatherAverages;

    fn paris() -> WeatherSnapshot {
        WeatherSnapshot {
            city: Some("Paris".into()),
            average: WeatherAverages {
                temperature: 20.0,
                humidity: 65.0,
                feels_like: 19.5,
                wind_speed: 3.2,
            },
        }
    }

    #[test]
    fn snapshot_renders_four_metrics_under_city() {
        let text = render_snapshot(&paris());
        assert_eq!(
            text,
            "Weather in Paris\n  Temperature: 20\n  Humidity: 65\n  Feels Like: 19.5\n  Wind Speed: 3.2\n"
        );
    }

    #[test]
    fn empty_view_renders_nothing() {
        assert_eq!(WeatherView::new().render(), "");
    }

    #[test]
    fn loading_view_shows_only_loading_line() {
        let view = WeatherView::new();
        view.state.lock().begin();
        assert_eq!(view.render(), "Loading...\n");
    }

    #[test]
    fn failed_refresh_shows_error_and_previous_snapshot() {
        let view = WeatherView::new();
        {
            let mut state = view.state.lock();
            let first = state.begin();
            state.settle(first, Ok(paris()));
            let second = state.begin();
            state.settle(second, Err(FETCH_WEATHER_FAILED.into()));
        }

        let text = view.render();
        assert!(text.starts_with("Failed to fetch weather data\n"));
        assert!(text.contains("Weather in Paris"));
        assert!(!text.contains("Loading"));
    }

    #[tokio::test]
    async fn unreachable_backend_sets_error_not_loading() {
        let api = ApiClient::new("http://127.0.0.1:9", crate::Session::default());
        let view = WeatherView::new();

        assert!(view.fetch_initial(&api).await.is_err());
        assert!(!view.is_loading());
        assert_eq!(view.error().as_deref(), Some(FETCH_INITIAL_WEATHER_FAILED));
    }
}
