//! # Agape Dashboard - Tauri 应用核心初始化模块
//!
//! 本模块负责 Tauri 应用的完整初始化流程，包括：
//! - 注册 Tauri 官方插件（文件系统、对话框、日志、浏览器打开）
//! - 注册自定义 Tauri commands（流式对话、仓库树、仪表盘数据）
//! - 初始化应用全局状态（对话会话、树视图、提供方客户端槽位）
//! - 生成应用上下文并启动事件循环
//!
//! ## 架构说明
//! 通过将核心逻辑放在 `lib.rs` 而非 `main.rs` 中，
//! Tauri 可以在桌面端（`main.rs`）和移动端入口之间共享此初始化代码。
//!
//! ## 模块结构
//! - `commands/` - Tauri command 处理函数（IPC 接口层）
//! - `models/` - 数据模型（对应前端 TypeScript 类型）
//! - `services/` - 核心业务逻辑（流式对话、树视图、fixture 数据）
//! - `utils/` - 通用工具函数

mod commands;
mod models;
mod services;
mod utils;

use services::state::AppState;

// `#[cfg_attr(mobile, tauri::mobile_entry_point)]`：条件编译属性
// 当目标平台为移动端（Android/iOS）时，此属性将 `run()` 函数标记为
// Tauri 移动端入口点，使移动端运行时能够正确定位并调用该函数。
// 在桌面端编译时，此属性不生效，`run()` 由 `main.rs` 直接调用。
#[cfg_attr(mobile, tauri::mobile_entry_point)]
/// Tauri 应用启动函数
///
/// 构建并运行 Tauri 应用实例。该函数完成以下工作：
/// 1. 创建 `tauri::Builder` 默认实例
/// 2. 注册所需的 Tauri 插件（文件系统、对话框、浏览器打开）
/// 3. 初始化应用全局状态（AppState）
/// 4. 注册所有自定义 Tauri commands
/// 5. 在 `setup` 钩子中按需注册调试专用插件（日志）
/// 6. 生成应用上下文并启动主事件循环
///
/// # Panics
/// 如果 Tauri 应用启动失败（例如配置文件缺失或窗口创建失败），
/// 将通过 `.expect()` 触发 panic 并输出错误信息。
pub fn run() {
    tauri::Builder::default()
        // === 官方插件注册 ===
        // 文件系统插件：允许前端通过 Tauri API 安全地写出导出文件
        .plugin(tauri_plugin_fs::init())
        // 对话框插件：提供原生的保存路径选择器（导出聊天记录时使用）
        .plugin(tauri_plugin_dialog::init())
        // Opener 插件：在系统浏览器中打开仓库主页链接（设置页 Repository Link）
        .plugin(tauri_plugin_opener::init())
        // === 应用全局状态初始化 ===
        // 注册 AppState 为 Tauri managed state，所有 command 函数可通过
        // `State<AppState>` 参数注入访问。AppState 包含：
        // - 对话会话（聊天记录 + 忙碌标志）
        // - 树视图状态（展开集合 + 单选）
        // - 提供方客户端槽位（首次使用时惰性创建）
        .manage(AppState::new())
        // === 自定义 Tauri Commands 注册 ===
        // 所有 command 函数通过 `invoke_handler` 注册，前端通过 `invoke()` 调用
        .invoke_handler(tauri::generate_handler![
            // 对话 commands
            commands::chat::send_prompt,
            commands::chat::get_transcript,
            commands::chat::reset_chat,
            commands::chat::provider_status,
            commands::chat::export_transcript,
            // 仓库树 commands
            commands::repo::get_repo_tree,
            commands::repo::get_tree_rows,
            commands::repo::toggle_folder,
            commands::repo::select_node,
            commands::repo::selected_file,
            // 仪表盘 commands
            commands::dashboard::get_dashboard,
        ])
        // `setup` 闭包：在应用窗口创建之前执行的初始化钩子
        .setup(|app| {
            // 仅在开发调试模式下启用日志插件
            if cfg!(debug_assertions) {
                app.handle().plugin(
                    tauri_plugin_log::Builder::default()
                        .level(log::LevelFilter::Info)
                        .build(),
                )?;
            }
            Ok(())
        })
        // `tauri::generate_context!()` 宏：在编译时读取 `tauri.conf.json` 配置文件，
        // 生成包含应用名称、窗口配置、安全策略等信息的上下文对象。
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
