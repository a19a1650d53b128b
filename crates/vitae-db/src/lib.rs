//! Record access for profiles and stored photos.
//!
//! Every profile lives in its own keyed database (bucket and key are both the
//! profile id). Photos share one media database with separate metadata and
//! data buckets.

pub mod photo;
pub mod profile;

pub use photo::PhotoRepository;
pub use profile::{get_profile, validate_profile_id, ProfileError, ProfileStore};
