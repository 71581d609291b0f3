//! Sequencing of one signed-in session.
//!
//! Sign-in captures the position once and reports it, then loads weather for
//! that position. The survey is shown next; submitting it refreshes the
//! weather and loads the nearby scores shown beside it.

use tracing::info;

use crate::{
    api::ApiClient,
    error::{ApiError, LocationError, SessionError, SurveyError},
    geolocation::{Geolocator, report_position},
    model::{Coordinates, FeelingScore, WeatherSnapshot},
    nearby::NearbyView,
    session::SessionController,
    survey::Survey,
    weather::WeatherView,
};

/// Which view is reachable right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    SignedOut,
    Survey,
    Dashboard,
}

pub struct Dashboard {
    controller: SessionController,
    locator: Box<dyn Geolocator>,
    survey: Survey,
    weather: WeatherView,
    nearby: NearbyView,
    location: Option<Coordinates>,
    location_error: Option<String>,
}

impl Dashboard {
    pub fn new(controller: SessionController, locator: Box<dyn Geolocator>) -> Self {
        Self {
            controller,
            locator,
            survey: Survey::new(),
            weather: WeatherView::new(),
            nearby: NearbyView::new(),
            location: None,
            location_error: None,
        }
    }

    pub fn screen(&self) -> Screen {
        if !self.controller.is_authenticated() {
            Screen::SignedOut
        } else if self.survey.is_submitted() {
            Screen::Dashboard
        } else {
            Screen::Survey
        }
    }

    pub fn api(&self) -> &ApiClient {
        self.controller.api()
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn survey(&self) -> &Survey {
        &self.survey
    }

    pub fn weather(&self) -> &WeatherView {
        &self.weather
    }

    pub fn nearby(&self) -> &NearbyView {
        &self.nearby
    }

    pub fn location(&self) -> Option<Coordinates> {
        self.location
    }

    pub fn location_error(&self) -> Option<&str> {
        self.location_error.as_deref()
    }

    pub async fn register(&mut self, username: &str, password: &str) -> Result<(), SessionError> {
        self.controller.register(username, password).await?;
        self.start_session().await;
        Ok(())
    }

    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), SessionError> {
        self.controller.login(username, password).await?;
        self.start_session().await;
        Ok(())
    }

    /// Pick up a session restored from storage. Does nothing when signed out.
    pub async fn resume(&mut self) {
        if self.controller.is_authenticated() {
            self.start_session().await;
        }
    }

    async fn start_session(&mut self) {
        info!("starting session flow");
        self.survey = Survey::new();
        self.nearby.clear();

        let _ = self.update_location().await;
        let _ = self.weather.fetch_by_coordinates(self.controller.api()).await;
    }

    /// Capture and report the current position. May be called again at any time.
    pub async fn update_location(&mut self) -> Result<Coordinates, LocationError> {
        self.location_error = None;

        match report_position(self.locator.as_ref(), self.controller.api()).await {
            Ok(coords) => {
                info!(%coords, "location updated");
                self.location = Some(coords);
                Ok(coords)
            }
            Err(err) => {
                if let LocationError::Update { coords, .. } = &err {
                    self.location = Some(*coords);
                }
                self.location_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn select_feeling(&mut self, score: FeelingScore) -> Result<(), SurveyError> {
        self.survey.select(score)
    }

    /// Submit the survey, then refresh weather and load nearby scores together.
    pub async fn submit_survey(&mut self) -> Result<FeelingScore, SurveyError> {
        let api = self.controller.api();
        let score = self.survey.submit(api).await?;

        let _ = tokio::join!(self.weather.fetch_by_coordinates(api), self.nearby.fetch(api));
        Ok(score)
    }

    pub async fn search_city(&self, city: &str) -> Result<WeatherSnapshot, ApiError> {
        self.weather.fetch_by_city(self.controller.api(), city).await
    }

    /// Clear the credential and everything shown for the session.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.survey = Survey::new();
        self.weather.clear();
        self.nearby.clear();
        self.location = None;
        self.location_error = None;

        self.controller.logout()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();

        if let Some(message) = &self.location_error {
            out.push_str(message);
            out.push('\n');
        }

        match self.screen() {
            Screen::SignedOut => out.push_str("Not signed in. Log in or register to continue.\n"),
            Screen::Survey => out.push_str(&self.survey.render()),
            Screen::Dashboard => {
                out.push_str(&self.weather.render());
                out.push('\n');
                out.push_str(&self.nearby.render());
            }
        }

        out
    }
}
