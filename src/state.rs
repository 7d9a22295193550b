use std::sync::Arc;

use crate::{
    db::DbPool,
    job::JobRepository,
    message::{MessageRepository, MessageService},
    notification::NotificationRepository,
    profile::ProfileRepository,
    realtime::ConnectionRegistry,
    service::ServiceRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub profile_repository: ProfileRepository,
    pub job_repository: JobRepository,
    pub service_repository: ServiceRepository,
    pub message_repository: MessageRepository,
    pub message_service: MessageService,
    pub notification_repository: NotificationRepository,
    pub registry: ConnectionRegistry,
}

impl AppState {
    pub fn new(db: DbPool, config: Arc<Config>) -> Self {
        let profile_repository = ProfileRepository::new(db.clone());
        let job_repository = JobRepository::new(db.clone());
        let service_repository = ServiceRepository::new(db.clone());
        let message_repository = MessageRepository::new(db.clone());
        let notification_repository = NotificationRepository::new(db.clone());
        let message_service =
            MessageService::new(message_repository.clone(), profile_repository.clone());

        Self {
            db,
            config,
            profile_repository,
            job_repository,
            service_repository,
            message_repository,
            message_service,
            notification_repository,
            registry: ConnectionRegistry::new(),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            jwt_secret: std::env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
        }
    }
}
