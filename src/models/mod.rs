//! # 数据模型模块
//!
//! 定义了与前端 TypeScript 类型一一对应的 Rust 数据结构。
//! 所有结构体均派生 `Serialize`（必要时加 `Deserialize`），用于 Tauri IPC 传输。
//! - `message` - 对话消息和流式事件的数据结构
//! - `repo` - 仓库文件树节点和树视图行的数据结构
//! - `metrics` - 仪表盘指标和图表数据的数据结构
//! - `settings` - 提供方配置状态的数据结构

pub mod message;
pub mod metrics;
pub mod repo;
pub mod settings;
