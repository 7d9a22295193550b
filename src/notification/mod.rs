pub mod notification_handlers;
pub mod notification_models;
pub mod notification_repository;

pub use notification_handlers::{get_notifications, mark_notification_read};
pub use notification_models::Notification;
pub use notification_repository::NotificationRepository;
