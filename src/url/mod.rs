//! URL handling for kagami
//!
//! Canonicalization for visited-set dedup and the origin policy that keeps
//! the crawl on-site.

mod canonical;
mod origin;

pub use canonical::{canonical_key, canonicalize};
pub use origin::OriginPolicy;
