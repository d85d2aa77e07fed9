//! # 仪表盘 Tauri Commands
//!
//! 提供 Mission Control 视图的 Tauri command 处理函数：
//! - `get_dashboard` - 一次性读取仪表盘全部 mock 数据

use crate::models::metrics::DashboardData;
use crate::services::dashboard;

/// 一次性读取仪表盘全部数据
///
/// 统计卡片、周活动序列、语言构成和仓库计数打包在一个快照里返回，
/// 避免前端发起多次 IPC 往返。数据是静态 fixture，没有失败路径。
#[tauri::command]
pub async fn get_dashboard() -> DashboardData {
    dashboard::dashboard_data()
}
