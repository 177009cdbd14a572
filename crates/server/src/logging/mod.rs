pub mod http_logger;
pub mod logger;

pub use http_logger::http_logger_middleware;
pub use logger::{BoxedLayer, LoggingConfig, LoggingError, filter_directive, init_with_config};
