//! # 业务逻辑服务模块
//!
//! 包含核心业务逻辑的实现，与 Tauri command 层解耦：
//! - `provider` - Gemini 流式客户端（SSE 解析、错误分类、显式生命周期）
//! - `chat` - 对话会话状态机与流式累加驱动
//! - `tree` - 文件树的展开/选中状态与可见行压平
//! - `repository` - mock 仓库树 fixture 与节点查找
//! - `dashboard` - 仪表盘指标 fixture
//! - `export` - 聊天记录导出（Markdown/JSON）
//! - `state` - 应用全局状态（Tauri managed state）

pub mod chat;
pub mod dashboard;
pub mod export;
pub mod provider;
pub mod repository;
pub mod state;
pub mod tree;
