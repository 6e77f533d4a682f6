// Navigation seam used by logout

use std::sync::Mutex;

use tracing::info;

/// Route logout sends the user back to
pub const ROOT_ROUTE: &str = "/";

/// Performs a full navigation in the embedding application
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Navigator for headless use; only logs the target route
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, route: &str) {
        info!("Navigating to {}", route);
    }
}

/// Navigator that remembers every route it was asked to open
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes
            .lock()
            .map(|routes| routes.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route.to_string());
        }
    }
}

/// Navigates to `route` when dropped, whatever path the scope exits by
pub(crate) struct NavigateOnDrop<'a> {
    navigator: &'a dyn Navigator,
    route: &'static str,
}

impl<'a> NavigateOnDrop<'a> {
    pub(crate) fn new(navigator: &'a dyn Navigator, route: &'static str) -> Self {
        Self { navigator, route }
    }
}

impl Drop for NavigateOnDrop<'_> {
    fn drop(&mut self) {
        self.navigator.navigate(self.route);
    }
}
