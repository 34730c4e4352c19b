//! Async component state management
//!
//! Provides the loading/error/refresh bookkeeping shared by everything that
//! fetches data in the background, plus request tracking so a response that
//! arrives after the user moved on can be recognised and dropped.

use std::time::{Duration, Instant};

/// Identity of one load started through [`AsyncState::start_loading`]
///
/// The generation changes whenever the state is invalidated (e.g. the
/// selected host changes); the sequence number orders loads within one
/// generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId {
    generation: u64,
    seq: u64,
}

impl RequestId {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Shared state for async-loading data
///
/// # Examples
///
/// ```
/// use procmon_pilot_core::async_state::AsyncState;
///
/// let mut state: AsyncState<Vec<String>> = AsyncState::idle();
///
/// let first = state.start_loading();
/// let second = state.start_loading();
/// assert!(state.is_loading());
///
/// // The newer response lands first
/// assert!(state.complete(second, vec!["new".to_string()]));
/// assert!(!state.is_loading());
///
/// // The older one is rejected
/// assert!(!state.complete(first, vec!["old".to_string()]));
/// assert_eq!(state.data().map(|d| d[0].as_str()), Some("new"));
/// ```
#[derive(Debug, Clone)]
pub struct AsyncState<T> {
    /// The loaded data (None if not yet loaded or cleared)
    data: Option<T>,
    /// Whether the latest started load is still outstanding
    loading: bool,
    /// Error message if the last load failed
    error: Option<String>,
    /// When the data was last successfully refreshed
    last_refresh: Option<Instant>,
    /// Number of consecutive failures
    retry_count: u32,
    generation: u64,
    next_seq: u64,
    /// Sequence number of the most recently started load
    latest_started: Option<u64>,
    /// Sequence number of the most recently applied response
    latest_applied: Option<u64>,
}

impl<T> Default for AsyncState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AsyncState<T> {
    /// Create a new async state in initial loading state
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Self::idle()
        }
    }

    /// Create a new async state that is not loading
    pub fn idle() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            last_refresh: None,
            retry_count: 0,
            generation: 0,
            next_seq: 0,
            latest_started: None,
            latest_applied: None,
        }
    }

    /// Create a new async state with initial data (not loading)
    pub fn with_data(data: T) -> Self {
        Self {
            data: Some(data),
            last_refresh: Some(Instant::now()),
            ..Self::idle()
        }
    }

    /// Check if currently loading
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Check if there's an error
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Get the error message if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Get a reference to the data
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Get a mutable reference to the data
    pub fn data_mut(&mut self) -> Option<&mut T> {
        self.data.as_mut()
    }

    /// Check if we have data (regardless of loading/error state)
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Get the last refresh time
    pub fn last_refresh(&self) -> Option<Instant> {
        self.last_refresh
    }

    /// Get the retry count
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Start a loading operation
    ///
    /// Sets loading to true but preserves existing data and error for display.
    /// The returned id must be handed back to [`complete`](Self::complete) or
    /// [`fail`](Self::fail).
    pub fn start_loading(&mut self) -> RequestId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.latest_started = Some(seq);
        self.loading = true;
        RequestId {
            generation: self.generation,
            seq,
        }
    }

    /// Current generation; bumped by [`invalidate`](Self::invalidate)
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a response for `id` would still be applied
    ///
    /// False once the state was invalidated after `id` was issued, or when a
    /// response to a newer request has already been applied.
    pub fn accepts(&self, id: RequestId) -> bool {
        id.generation == self.generation && self.latest_applied.is_none_or(|seq| id.seq > seq)
    }

    /// Apply a successful response; returns false (and changes nothing) if stale
    pub fn complete(&mut self, id: RequestId, data: T) -> bool {
        if !self.accepts(id) {
            return false;
        }
        self.latest_applied = Some(id.seq);
        if self.latest_started == Some(id.seq) {
            self.loading = false;
        }
        self.data = Some(data);
        self.error = None;
        self.retry_count = 0;
        self.last_refresh = Some(Instant::now());
        true
    }

    /// Apply a failed response; returns false (and changes nothing) if stale
    ///
    /// Existing data is kept for continued display.
    pub fn fail(&mut self, id: RequestId, error: impl ToString) -> bool {
        if !self.accepts(id) {
            return false;
        }
        self.latest_applied = Some(id.seq);
        if self.latest_started == Some(id.seq) {
            self.loading = false;
        }
        self.error = Some(error.to_string());
        self.retry_count += 1;
        true
    }

    /// Reject every response to loads started so far
    ///
    /// Data is left alone; use [`clear`](Self::clear) to drop it too.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.loading = false;
        self.latest_started = None;
        self.latest_applied = None;
    }

    /// Set the data directly, outside of request tracking
    pub fn set_data(&mut self, data: T) {
        self.data = Some(data);
        self.loading = false;
        self.error = None;
        self.retry_count = 0;
        self.last_refresh = Some(Instant::now());
    }

    /// Clear all state and invalidate outstanding loads
    pub fn clear(&mut self) {
        self.invalidate();
        self.data = None;
        self.error = None;
        self.last_refresh = None;
        self.retry_count = 0;
    }

    /// Check if a refresh is needed based on the interval
    ///
    /// Returns true if data has never been loaded or the interval has elapsed
    /// since the last refresh. Returns false while loading.
    pub fn should_refresh(&self, interval: Duration) -> bool {
        if self.loading {
            return false;
        }

        match self.last_refresh {
            None => true,
            Some(last) => last.elapsed() >= interval,
        }
    }

    /// Get elapsed time since last refresh
    pub fn elapsed_since_refresh(&self) -> Option<Duration> {
        self.last_refresh.map(|t| t.elapsed())
    }
}

/// Extension trait for working with AsyncState in TUI components
pub trait AsyncStateExt<T> {
    /// Get display status text
    fn status_text(&self) -> &'static str;

    /// Check if we should show loading indicator
    fn show_loading(&self) -> bool;

    /// Check if we should show error
    fn show_error(&self) -> bool;
}

impl<T> AsyncStateExt<T> for AsyncState<T> {
    fn status_text(&self) -> &'static str {
        if self.loading && self.data.is_none() {
            "Loading..."
        } else if self.loading {
            "Refreshing..."
        } else if self.error.is_some() {
            "Error"
        } else {
            "Ready"
        }
    }

    fn show_loading(&self) -> bool {
        self.loading && self.data.is_none()
    }

    fn show_error(&self) -> bool {
        self.error.is_some() && self.data.is_none()
    }
}
