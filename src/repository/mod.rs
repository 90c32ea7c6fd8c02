//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod db;
mod positioning;
mod course_repo;
mod batch_repo;
mod section_repo;
mod enrollment_repo;
mod instructor_repo;
mod blog_repo;
mod payment_repo;
pub mod session;


pub use traits::{Repository, SearchableRepository};
pub use db::{init_db, DbState, SharedConnection};
pub use course_repo::CourseRepository;
pub use batch_repo::BatchRepository;
pub use section_repo::SectionRepository;
pub use enrollment_repo::EnrollmentRepository;
pub use instructor_repo::InstructorRepository;
pub use blog_repo::BlogRepository;
pub use payment_repo::PaymentRepository;
pub use session::{ScopeChange, SessionHierarchyOperations, SessionPositioningOperations, SessionRepository};
