pub mod photo;
pub mod profile;

pub use photo::{ImageKind, Photo};
pub use profile::{Profile, ProfileUpdate};
