use std::sync::Arc;

use ns_scrapers::ReportManager;
use tokio::sync::Mutex;

pub struct AppState {
    pub manager: Arc<ReportManager>,
    /// Held for the whole of a report run; requests are served one at a time.
    pub generate_lock: Mutex<()>,
}

impl AppState {
    pub fn new(manager: Arc<ReportManager>) -> Self {
        Self {
            manager,
            generate_lock: Mutex::new(()),
        }
    }
}
