pub mod job_dto;
pub mod job_handlers;
pub mod job_models;
pub mod job_repository;

pub use job_dto::{
    CreateJobRequest, DeleteJobQuery, JobListQuery, JobListResponse, UpdateJobRequest,
};
pub use job_handlers::{create_job, delete_job, search_jobs, update_job};
pub use job_models::{Job, JobSort, JobStatus};
pub use job_repository::JobRepository;
