//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! Nothing here touches the database or HTTP.

mod entity;
mod course;
mod batch;
mod section;
mod session;
mod enrollment;
mod instructor;
mod blog;
mod payment;
pub mod ordering;

pub use entity::{new_id, now_millis, DomainError, DomainResult, Entity};
pub use course::{Course, CourseView};
pub use batch::Batch;
pub use section::Section;
pub use session::Session;
pub use enrollment::{Enrollment, EnrollmentStatus, ProgressSummary};
pub use instructor::{normalize_email, Instructor};
pub use blog::{slugify, BlogPost};
pub use payment::{Payment, PaymentStatus};
pub use ordering::{OrderWrite, OrderedItem, ReorderPlan, ScopeKey};
