//! End-to-end session flow against a mock backend.

use std::sync::Arc;

use feels_core::{
    ApiClient, Coordinates, CredentialStore, Dashboard, FeelingScore, MemoryCredentialStore,
    Screen, Session, SessionController, SurveyState, geolocation::fixed::FixedLocator,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PARIS: Coordinates = Coordinates { latitude: 48.85, longitude: 2.35 };

fn dashboard(server: &MockServer, store: Arc<MemoryCredentialStore>) -> Dashboard {
    let api = ApiClient::new(server.uri(), Session::default());
    let controller = SessionController::new(api, store).unwrap();
    Dashboard::new(controller, Box::new(FixedLocator::new(PARIS)))
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": "tok"})),
        )
        .mount(server)
        .await;
}

fn coordinates_weather() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "city": "Paris",
        "weather": {
            "city": "Paris",
            "average": {"temperature": 20, "humidity": 65, "feels_like": 19, "wind_speed": 3.5}
        }
    }))
}

#[tokio::test]
async fn login_survey_then_dashboard() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/update-location"))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(serde_json::json!({"latitude": 48.85, "longitude": 2.35})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Location updated successfully"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Once after login, once after the survey.
    Mock::given(method("GET"))
        .and(path("/weather/coordinates"))
        .respond_with(coordinates_weather())
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/update-feeling"))
        .and(body_json(serde_json::json!({"feeling_score": 4})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/nearby-scores"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"feeling_score": 2, "distance": 0.01}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::default());
    let mut dash = dashboard(&mock_server, store.clone());
    assert_eq!(dash.screen(), Screen::SignedOut);

    dash.login("alice", "secret").await.unwrap();
    assert_eq!(dash.screen(), Screen::Survey);
    assert_eq!(dash.location(), Some(PARIS));
    assert!(dash.location_error().is_none());
    assert!(store.load().unwrap().is_some());
    assert!(dash.weather().snapshot().is_some());

    dash.select_feeling(FeelingScore::try_from(1_i64).unwrap()).unwrap();
    dash.select_feeling(FeelingScore::try_from(4_i64).unwrap()).unwrap();
    let submitted = dash.submit_survey().await.unwrap();
    assert_eq!(submitted.value(), 4);
    assert_eq!(dash.screen(), Screen::Dashboard);

    let text = dash.render();
    assert!(text.contains("Weather in Paris"));
    assert!(text.contains("Feeling: Slightly Cold"));
    assert!(text.contains("Distance: 1.11 km"));

    dash.logout().unwrap();
    assert_eq!(dash.screen(), Screen::SignedOut);
    assert!(dash.weather().snapshot().is_none());
    assert!(dash.nearby().scores().is_none());
    assert!(store.load().unwrap().is_none());
}

#[tokio::test]
async fn register_captures_location_once_and_lands_on_survey() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/register"))
        .and(body_json(serde_json::json!({"username": "bob", "password": "pw"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"access_token": "new"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/update-location"))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather/coordinates"))
        .respond_with(coordinates_weather())
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::default());
    let mut dash = dashboard(&mock_server, store.clone());

    dash.register("bob", "pw").await.unwrap();
    assert_eq!(dash.screen(), Screen::Survey);
    assert_eq!(dash.location(), Some(PARIS));
    assert!(dash.location_error().is_none());
    assert!(store.load().unwrap().is_some());
    assert!(dash.render().contains("Weather Survey"));
}

#[tokio::test]
async fn failed_location_update_keeps_position_and_reports_error() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/update-location"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather/coordinates"))
        .respond_with(coordinates_weather())
        .mount(&mock_server)
        .await;

    let mut dash = dashboard(&mock_server, Arc::new(MemoryCredentialStore::default()));
    dash.login("alice", "secret").await.unwrap();

    assert_eq!(dash.location_error(), Some("Failed to update location"));
    assert_eq!(dash.location(), Some(PARIS));
    assert_eq!(dash.screen(), Screen::Survey);
}

#[tokio::test]
async fn rejected_survey_can_be_resubmitted() {
    let mock_server = MockServer::start().await;
    mount_token(&mock_server).await;

    Mock::given(method("POST"))
        .and(path("/update-location"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather/coordinates"))
        .respond_with(coordinates_weather())
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/nearby-scores"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/update-feeling"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/update-feeling"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let mut dash = dashboard(&mock_server, Arc::new(MemoryCredentialStore::default()));
    dash.login("alice", "secret").await.unwrap();

    let score = FeelingScore::try_from(3_i64).unwrap();
    dash.select_feeling(score).unwrap();

    assert!(dash.submit_survey().await.is_err());
    assert_eq!(dash.survey().state(), SurveyState::Selected(score));
    assert_eq!(dash.survey().error(), Some("Failed to submit feeling score"));
    assert_eq!(dash.screen(), Screen::Survey);

    dash.submit_survey().await.unwrap();
    assert_eq!(dash.survey().state(), SurveyState::Submitted(score));
    assert!(dash.survey().error().is_none());
    assert!(dash.render().contains("No nearby weather feelings available."));
}

#[tokio::test]
async fn restored_session_resumes_without_login() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/update-location"))
        .and(header("authorization", "Bearer stored"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather/coordinates"))
        .respond_with(coordinates_weather())
        .mount(&mock_server)
        .await;

    let store = Arc::new(MemoryCredentialStore::with_credential(
        feels_core::Credential::new("stored"),
    ));
    let mut dash = dashboard(&mock_server, store);
    assert_eq!(dash.screen(), Screen::Survey);

    dash.resume().await;
    assert_eq!(dash.location(), Some(PARIS));
}
