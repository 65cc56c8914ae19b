pub(crate) mod annotate;
pub(crate) mod app;
pub(crate) mod export;
pub(crate) mod report;
