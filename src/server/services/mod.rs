pub mod addon_services;
pub mod catalog_services;
pub mod page_services;
pub mod rate_limit_services;
pub mod stream_services;

pub use addon_services::AddonServices;
pub use catalog_services::DynCatalogService;
pub use page_services::DynPageService;
pub use rate_limit_services::DynRateLimitService;
pub use stream_services::DynStreamsService;
