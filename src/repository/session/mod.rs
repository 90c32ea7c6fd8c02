//! Session Repository Module
//!
//! This module provides session repository functionality split into specialized sub-modules:
//! - session_repo: Core CRUD operations
//! - session_hierarchy: Listing by batch and section
//! - session_positioning: Reordering and scope moves

mod session_repo;
mod session_hierarchy;
mod session_positioning;

pub use session_repo::SessionRepository;
pub(crate) use session_repo::find_session;

// Re-export all operation traits so they can be used by importing SessionRepository
pub use session_hierarchy::SessionHierarchyOperations;
pub use session_positioning::{ScopeChange, SessionPositioningOperations};
