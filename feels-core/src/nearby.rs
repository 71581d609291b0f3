use parking_lot::Mutex;
use std::fmt::Write;

use crate::{
    api::ApiClient,
    error::ApiError,
    model::NearbyScore,
    view::{Status, ViewState},
};

pub const FETCH_NEARBY_FAILED: &str = "Failed to fetch nearby feeling scores";
pub const NO_NEARBY_DATA: &str = "No nearby weather feelings available.";

/// Other users' feeling scores around the current user.
#[derive(Debug, Default)]
pub struct NearbyView {
    state: Mutex<ViewState<Vec<NearbyScore>>>,
}

impl NearbyView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fetch(&self, api: &ApiClient) -> Result<Vec<NearbyScore>, ApiError> {
        let ticket = self.state.lock().begin();
        let outcome = api.nearby_scores().await;

        let settled = match &outcome {
            Ok(scores) => Ok(scores.clone()),
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch nearby scores");
                Err(FETCH_NEARBY_FAILED.to_string())
            }
        };
        self.state.lock().settle(ticket, settled);

        outcome
    }

    pub fn scores(&self) -> Option<Vec<NearbyScore>> {
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

    /// Loading line, error line, or the list. An empty list gets its own message.
    pub fn render(&self) -> String {
        let state = self.state.lock();

        match state.status() {
            Status::Loading => "Loading nearby feelings...\n".to_string(),
            Status::Failed(message) => format!("{message}\n"),
            Status::Idle => match state.data() {
                Some(scores) => render_scores(scores),
                None => String::new(),
            },
        }
    }
}

pub fn render_scores(scores: &[NearbyScore]) -> String {
    let mut out = String::from("Nearby Weather Feelings\n");

    if scores.is_empty() {
        let _ = writeln!(out, "  {NO_NEARBY_DATA}");
        return out;
    }

    for score in scores {
        let _ = writeln!(
            out,
            "  Feeling: {:<14} Distance: {:.2} km",
            score.feeling_label(),
            score.distance_km()
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_renders_no_data_message() {
        let text = render_scores(&[]);
        assert!(text.contains(NO_NEARBY_DATA));
        assert!(!text.contains(FETCH_NEARBY_FAILED));
    }

    #[test]
    fn scores_render_label_and_km_distance() {
        let text = render_scores(&[NearbyScore { feeling_score: 4, distance: 0.01 }]);
        assert!(text.contains("Feeling: Warm"));
        assert!(text.contains("Distance: 1.11 km"));
    }

    #[test]
    fn scores_keep_server_order() {
        let text = render_scores(&[
            NearbyScore { feeling_score: 5, distance: 0.05 },
            NearbyScore { feeling_score: 1, distance: 0.0 },
        ]);
        let hot = text.find("Hot").unwrap();
        let cold = text.find("Freezing Cold").unwrap();
        assert!(hot < cold);
        assert!(text.contains("Distance: 0.00 km"));
    }

    #[test]
    fn error_renders_alone() {
        let view = NearbyView::new();
        {
            let mut state = view.state.lock();
            let ticket = state.begin();
            state.settle(ticket, Err(FETCH_NEARBY_FAILED.into()));
        }
        assert_eq!(view.render(), format!("{FETCH_NEARBY_FAILED}\n"));
    }

    #[test]
    fn loading_renders_loading_line() {
        let view = NearbyView::new();
        view.state.lock().begin();
        assert_eq!(view.render(), "Loading nearby feelings...\n");
    }
}
