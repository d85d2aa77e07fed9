//! # Tauri Command 处理模块
//!
//! 本模块包含所有注册到 Tauri 的 command 处理函数。
//! 每个子模块对应一个功能域：
//! - `chat` - 流式对话、聊天记录读取/重置/导出相关 commands
//! - `repo` - 仓库树浏览和文件选中相关 commands
//! - `dashboard` - 仪表盘 mock 数据相关 commands

pub mod chat;
pub mod dashboard;
pub mod repo;
