use std::sync::Arc;

use crate::core::config::Settings;
use crate::services::rois::RoiService;

#[derive(Clone)]
pub(crate) struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    rois: RoiService,
}

impl AppState {
    pub(crate) fn new(settings: Settings, rois: RoiService) -> Self {
        Self { inner: Arc::new(InnerState { settings, rois }) }
    }

    pub(crate) fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub(crate) fn rois(&self) -> &RoiService {
        &self.inner.rois
    }
}
