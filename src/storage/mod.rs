pub mod paths;
pub mod runtime;
pub mod viewer_config;
