/// Ready-made overlay messages offered next to the free-text editor.
pub const SUGGESTED_MESSAGES: &[&str] = &[
    "Excited to be part of Cloud Community Day 2025!",
    "Learning, networking, and growing with the cloud community!",
    "Cloud Community Day 2025 - Where innovation meets collaboration!",
    "Proud to be part of the GDG community! #CCD2025",
    "Building the future with cloud technology!",
    "Connecting with amazing cloud enthusiasts at CCD 2025!",
];
