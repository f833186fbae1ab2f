pub(crate) mod errors;
pub(crate) mod extract;
pub(crate) mod handlers;
pub(crate) mod rois;
pub(crate) mod router;
pub(crate) mod routes;
pub(crate) mod viewer;
