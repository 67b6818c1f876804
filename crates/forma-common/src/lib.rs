pub mod errors;
pub mod formation;
pub mod id;
pub mod json;
pub mod notifications;

pub use errors::{ConfigError, FormaError};
pub use formation::{Formation, FormationSource, Lesson, LessonKind, Module};
pub use id::{new_id, new_thread_id, SessionId};
pub use notifications::{
    CredentialSink, Notification, NotificationLevel, NotificationQueue, TracingCredentialSink,
};

pub type Result<T> = std::result::Result<T, FormaError>;
