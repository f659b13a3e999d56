//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod event;
pub mod notification;
pub mod summary;
pub mod task;
pub mod user;

// Re-export commonly used models
pub use event::{
    CreateEventRequest, CreatePositionRequest, Event, EventDetail, EventFilter, LifecycleState,
    UpdateEventRequest, VolunteeringPosition,
};
pub use notification::{Notification, NotificationKind};
pub use summary::{CreateFeedbackRequest, CreateSummaryRequest, EventSummary, Feedback};
pub use task::{AssignTasksRequest, SubmitProofRequest, Task, TaskStatus};
pub use user::{CreateUserRequest, User, UserRole};
