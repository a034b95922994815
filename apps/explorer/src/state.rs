use std::sync::Arc;

use tokio::sync::Mutex;

use crate::api_client::AnalysisApi;
use crate::submission::form::JobForm;
use crate::submission::session::Session;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable analysis backend. Default: `HttpAnalysisClient`.
    pub api: Arc<dyn AnalysisApi>,
    /// The one analysis session this explorer drives. Never locked across an upstream call.
    pub session: Arc<Mutex<Session>>,
    pub form: Arc<Mutex<JobForm>>,
}

impl AppState {
    pub fn new(api: Arc<dyn AnalysisApi>) -> Self {
        Self {
            api,
            session: Arc::new(Mutex::new(Session::default())),
            form: Arc::new(Mutex::new(JobForm::default())),
        }
    }
}
