//! Pure geometry: where the photo goes and how the message breaks into lines.

pub(crate) mod frame;
pub(crate) mod wrap;
