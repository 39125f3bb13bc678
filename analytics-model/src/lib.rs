//! Domain model for the analytics resource service
//!
//! An [`Analysis`] is a saved analytical configuration plus resource
//! metadata: title, abstract, an opaque JSON payload, ratings, and a
//! per-entity access policy. Persistence goes through the
//! [`AnalysisStore`] trait so the hosting platform can plug in its own
//! backend; [`MemoryStore`] is the reference implementation used by the
//! server and the test suite.

pub mod entity;
pub mod error;
pub mod memory;
pub mod policy;
pub mod sanitize;
pub mod store;

pub use entity::{Analysis, MetadataUpdate, NewAnalysis, Rating};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use policy::{authorize, AccessDenied, AccessPolicy, Capability};
pub use sanitize::strip_tags;
pub use store::{AnalysisStore, Page};
