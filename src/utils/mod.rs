//! # 通用工具模块
//!
//! - `time` - 不依赖日期库的 ISO 8601 时间格式化工具

pub mod time;
