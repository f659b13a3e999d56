//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod capacity;
pub mod event;
pub mod feedback;
pub mod notification;
pub mod summary;
pub mod task;
pub mod user;

// Re-export repositories
pub use capacity::CapacityLedger;
pub use event::EventRepository;
pub use feedback::FeedbackRepository;
pub use notification::NotificationRepository;
pub use summary::SummaryRepository;
pub use task::TaskRepository;
pub use user::UserRepository;
