use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    credential::Credential,
    error::ApiError,
    model::{
        Coordinates, CoordinatesWeather, FeelingScore, FeelingUpdate, NearbyScore, Registration,
        TokenResponse, WeatherSnapshot,
    },
    session::Session,
};

/// HTTP client for the weather feels backend.
///
/// Reads the shared [`Session`] on every call and attaches the credential as a
/// bearer token when one is present.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Session) -> Self {
        Self {
            base_url: base_url.into(),
            http: Client::new(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// `POST /register` with a JSON body.
    pub async fn register(&self, username: &str, password: &str) -> Result<Credential, ApiError> {
        let endpoint = "POST /register";
        let request = self
            .http
            .post(self.url(&["register"])?)
            .json(&Registration { username, password });

        let token: TokenResponse = parse(endpoint, &self.send(endpoint, request).await?)?;
        Ok(token.into_credential())
    }

    /// `POST /token` with a form-encoded body.
    pub async fn login(&self, username: &str, password: &str) -> Result<Credential, ApiError> {
        let endpoint = "POST /token";
        let request = self
            .http
            .post(self.url(&["token"])?)
            .form(&[("username", username), ("password", password)]);

        let token: TokenResponse = parse(endpoint, &self.send(endpoint, request).await?)?;
        Ok(token.into_credential())
    }

    /// `GET /initial-weather`; authenticated when a session is active, anonymous otherwise.
    pub async fn initial_weather(&self) -> Result<WeatherSnapshot, ApiError> {
        let endpoint = "GET /initial-weather";
        let mut request = self.http.get(self.url(&["initial-weather"])?);
        if let Some(credential) = self.session.credential() {
            request = request.bearer_auth(credential.as_str());
        }

        parse(endpoint, &self.send(endpoint, request).await?)
    }

    /// `GET /weather/compare/{city}`.
    pub async fn weather_by_city(&self, city: &str) -> Result<WeatherSnapshot, ApiError> {
        let endpoint = "GET /weather/compare";
        let request = self.authorized(Method::GET, &["weather", "compare", city])?;

        parse(endpoint, &self.send(endpoint, request).await?)
    }

    /// `GET /weather/coordinates`, for the position last reported by this user.
    pub async fn weather_by_coordinates(&self) -> Result<WeatherSnapshot, ApiError> {
        let endpoint = "GET /weather/coordinates";
        let request = self.authorized(Method::GET, &["weather", "coordinates"])?;

        let body: CoordinatesWeather = parse(endpoint, &self.send(endpoint, request).await?)?;
        Ok(body.into_snapshot())
    }

    /// `POST /update-location`.
    pub async fn update_location(&self, coords: Coordinates) -> Result<(), ApiError> {
        let endpoint = "POST /update-location";
        let request = self.authorized(Method::POST, &["update-location"])?.json(&coords);

        self.send(endpoint, request).await?;
        Ok(())
    }

    /// `POST /update-feeling`.
    pub async fn update_feeling(&self, score: FeelingScore) -> Result<(), ApiError> {
        let endpoint = "POST /update-feeling";
        let request = self
            .authorized(Method::POST, &["update-feeling"])?
            .json(&FeelingUpdate { feeling_score: score });

        self.send(endpoint, request).await?;
        Ok(())
    }

    /// `GET /nearby-scores`, in server order.
    pub async fn nearby_scores(&self) -> Result<Vec<NearbyScore>, ApiError> {
        let endpoint = "GET /nearby-scores";
        let request = self.authorized(Method::GET, &["nearby-scores"])?;

        parse(endpoint, &self.send(endpoint, request).await?)
    }

    fn authorized(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let credential = self.session.credential().ok_or(ApiError::NotAuthenticated)?;
        Ok(self
            .http
            .request(method, self.url(segments)?)
            .bearer_auth(credential.as_str()))
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url).map_err(|err| ApiError::BaseUrl {
            url: self.base_url.clone(),
            reason: err.to_string(),
        })?;

        url.path_segments_mut()
            .map_err(|_| ApiError::BaseUrl {
                url: self.base_url.clone(),
                reason: "URL cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    async fn send(&self, endpoint: &str, request: RequestBuilder) -> Result<String, ApiError> {
        debug!(endpoint, "sending request");

        let res = request.send().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source,
        })?;

        if !status.is_success() {
            debug!(endpoint, %status, "request rejected");
            return Err(ApiError::Status {
                endpoint: endpoint.to_string(),
                status,
                body: truncate_body(&body),
            });
        }

        Ok(body)
    }
}

impl TokenResponse {
    fn into_credential(self) -> Credential {
        debug!(token_type = self.token_type.as_deref().unwrap_or("bearer"), "received token");
        Credential::new(self.access_token)
    }
}

fn parse<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|source| ApiError::Decode {
        endpoint: endpoint.to_string(),
        source,
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_encodes_city_segment() {
        let api = ApiClient::new("http://localhost:8000", Session::default());
        let url = api.url(&["weather", "compare", "New York"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/weather/compare/New%20York");
    }

    #[test]
    fn url_keeps_base_path_prefix() {
        let api = ApiClient::new("http://localhost:8000/api/", Session::default());
        let url = api.url(&["nearby-scores"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/nearby-scores");
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let api = ApiClient::new("not a url", Session::default());
        let err = api.url(&["token"]).unwrap_err();
        assert!(err.to_string().contains("not a url"));
    }

    #[test]
    fn authorized_requests_need_a_credential() {
        let api = ApiClient::new("http://localhost:8000", Session::default());
        let err = api.authorized(Method::GET, &["nearby-scores"]).unwrap_err();
        assert!(matches!(err, ApiError::NotAuthenticated));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        // Byte 200 falls inside a two-byte character.
        let body = format!("a{}", "é".repeat(150));
        let truncated = truncate_body(&body);
        assert_eq!(truncated, format!("a{}...", "é".repeat(99)));
    }
}
