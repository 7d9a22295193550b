pub mod service_dto;
pub mod service_handlers;
pub mod service_models;
pub mod service_repository;

pub use service_dto::{
    CreateServiceRequest, DeleteServiceQuery, PricingRequest, PricingResponse, ServiceListQuery,
    ServiceListResponse, ServiceResponse, UpdatePricingRequest, UpdateServiceRequest,
};
pub use service_handlers::{create_service, delete_service, search_services, update_service};
pub use service_models::{Service, ServicePricing, ServiceSort, ServiceStatus};
pub use service_repository::ServiceRepository;
