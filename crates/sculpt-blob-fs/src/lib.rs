//! Local filesystem backend for Sculpt blobs.
//!
//! Layout under the storage root:
//!
//! ```text
//! <root>/photos/<key>
//! <root>/models/<key>
//! <root>/.tmp/<uuid>      in-flight writes, renamed into place
//! ```

mod path;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use path::validate_key;
pub use store::FsBlobStore;
