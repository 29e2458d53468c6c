use std::sync::Arc;

use linkhop_redirector::Redirector;
use linkhop_shortener::Shortener;

#[derive(Clone)]
pub struct AppState {
    pub shortener: Arc<dyn Shortener>,
    pub redirector: Arc<dyn Redirector>,
}

impl AppState {
    pub fn new(shortener: Arc<dyn Shortener>, redirector: Arc<dyn Redirector>) -> Self {
        Self {
            shortener,
            redirector,
        }
    }
}
