//! 核心模块
//!
//! 错误类型、通用宏与日志初始化。

pub mod error;
pub mod logging;
pub mod macros;

pub use error::{ConfigError, ConfigResult, SkeletonError, SkeletonResult};
pub use logging::init_logging;
