use tracing::warn;

/// Identifies one request started against a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// What a view is currently showing besides its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status<'a> {
    Idle,
    Loading,
    Failed(&'a str),
}

/// Loading/error/data triple shared by the fetching views.
///
/// Loading and error are never set together: starting a request clears the
/// error, settling it clears loading. Only the most recently started request
/// may settle; older responses are dropped.
#[derive(Debug, Clone)]
pub struct ViewState<T> {
    data: Option<T>,
    loading: bool,
    error: Option<String>,
    latest: u64,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            latest: 0,
        }
    }
}

impl<T> ViewState<T> {
    pub fn begin(&mut self) -> Ticket {
        self.latest += 1;
        self.loading = true;
        self.error = None;
        Ticket(self.latest)
    }

    /// Apply a response. Returns false when `ticket` was superseded.
    pub fn settle(&mut self, ticket: Ticket, outcome: Result<T, String>) -> bool {
        if ticket.0 != self.latest {
            warn!(ticket = ticket.0, latest = self.latest, "discarding stale response");
            return false;
        }

        self.loading = false;
        match outcome {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(message) => self.error = Some(message),
        }
        true
    }

    /// Forget everything. Requests still in flight will be discarded when they land.
    pub fn reset(&mut self) {
        self.latest += 1;
        self.data = None;
        self.loading = false;
        self.error = None;
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn status(&self) -> Status<'_> {
        if self.loading {
            Status::Loading
        } else if let Some(message) = &self.error {
            Status::Failed(message)
        } else {
            Status::Idle
        }
    }
}
