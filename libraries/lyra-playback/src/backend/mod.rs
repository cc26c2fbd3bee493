//! Media backends shipped with the crate

mod silent;

pub use silent::SilentBackend;
