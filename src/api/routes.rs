//! Named-route table for reverse URL lookup.
//!
//! Clients of the host application address these routes by name
//! (`ol3-viewer-index` and friends) rather than by hard-coded path, so the
//! name-to-path mapping is part of the public contract and lives here in one
//! place.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RouteName {
    Index,
    Plugin,
    PluginDebug,
    RequestRois,
}

pub(crate) const ALL_ROUTES: &[RouteName] =
    &[RouteName::Index, RouteName::Plugin, RouteName::PluginDebug, RouteName::RequestRois];

impl RouteName {
    pub(crate) fn name(self) -> &'static str {
        match self {
            RouteName::Index => "ol3-viewer-index",
            RouteName::Plugin => "ol3-viewer-plugin",
            RouteName::PluginDebug => "ol3-viewer-plugin-debug",
            RouteName::RequestRois => "ol3-viewer-request-rois",
        }
    }

    #[allow(dead_code)]
    pub(crate) fn from_name(name: &str) -> Option<Self> {
        ALL_ROUTES.iter().copied().find(|route| route.name() == name)
    }

    fn prefix(self) -> &'static str {
        match self {
            RouteName::Index => "",
            RouteName::Plugin => "/plugin",
            RouteName::PluginDebug => "/plugin-debug",
            RouteName::RequestRois => "/request_rois",
        }
    }

    /// Build the concrete path for this route, with or without an image id.
    pub(crate) fn reverse(self, iid: Option<i64>) -> String {
        match iid {
            Some(iid) => format!("{}/{}", self.prefix(), iid),
            None if self.prefix().is_empty() => "/".to_string(),
            None => self.prefix().to_string(),
        }
    }
}
