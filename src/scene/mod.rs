pub(crate) mod presets;
pub(crate) mod request;
