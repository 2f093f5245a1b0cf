/// PNG output and download naming.
pub(crate) mod png;
