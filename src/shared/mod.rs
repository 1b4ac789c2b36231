pub mod service_config;
pub mod shared_models;
pub mod utility;
