//! # 仓库树 Tauri Commands
//!
//! 提供仓库浏览视图的 Tauri command 处理函数：
//! - `get_repo_tree` - 读取完整 mock 仓库树
//! - `get_tree_rows` - 读取当前可见的树行列表（展示层）
//! - `toggle_folder` - 切换文件夹展开状态
//! - `select_node` - 选中文件节点（单选）
//! - `selected_file` - 读取当前选中的文件
//!
//! 变更类 command 在操作后直接返回更新后的行列表，
//! 前端无需再发一次查询往返。

use tauri::State;

use crate::models::repo::{FileNode, TreeRow};
use crate::services::repository::repo_tree;
use crate::services::state::AppState;

/// 读取完整 mock 仓库树
///
/// 树是静态数据，整个会话期间不变；前端通常只在挂载时调用一次。
#[tauri::command]
pub async fn get_repo_tree() -> FileNode {
    repo_tree().clone()
}

/// 读取当前可见的树行列表
///
/// 行列表由不可变树数据和当前展开/选中状态联合计算，
/// 前端按顺序渲染即可，无需自行递归。
///
/// # 错误
/// 仅在状态锁损坏时返回错误
#[tauri::command]
pub async fn get_tree_rows(state: State<'_, AppState>) -> Result<Vec<TreeRow>, String> {
    let tree = state
        .tree()
        .read()
        .map_err(|_| "树视图状态锁已损坏".to_string())?;
    Ok(tree.visible_rows(repo_tree()))
}

/// 切换一个文件夹的展开状态
///
/// 只影响目标节点自身；兄弟节点的展开状态和当前选中都不变。
/// 目标不存在或不是文件夹时为无操作。
///
/// # 参数
/// - `node_id` - 目标文件夹的节点 id
///
/// # 返回值
/// 更新后的可见行列表
///
/// # 错误
/// 仅在状态锁损坏时返回错误
#[tauri::command]
pub async fn toggle_folder(
    node_id: String,
    state: State<'_, AppState>,
) -> Result<Vec<TreeRow>, String> {
    let mut tree = state
        .tree()
        .write()
        .map_err(|_| "树视图状态锁已损坏".to_string())?;
    tree.toggle(repo_tree(), &node_id);
    Ok(tree.visible_rows(repo_tree()))
}

/// 选中一个文件节点
///
/// 单选语义：替换之前的任何选中。目标是文件夹时为无操作，
/// 返回 None 且原有选中保持不变；树的展开状态不受影响。
///
/// # 参数
/// - `node_id` - 目标文件的节点 id
///
/// # 返回值
/// 选中成功时返回该节点的完整快照（含预览内容），供预览面板渲染
///
/// # 错误
/// 仅在状态锁损坏时返回错误
#[tauri::command]
pub async fn select_node(
    node_id: String,
    state: State<'_, AppState>,
) -> Result<Option<FileNode>, String> {
    let mut tree = state
        .tree()
        .write()
        .map_err(|_| "树视图状态锁已损坏".to_string())?;
    Ok(tree.select(repo_tree(), &node_id))
}

/// 读取当前选中的文件节点
///
/// 没有选中任何文件时返回 None（前端显示"选择一个文件"占位）。
///
/// # 错误
/// 仅在状态锁损坏时返回错误
#[tauri::command]
pub async fn selected_file(state: State<'_, AppState>) -> Result<Option<FileNode>, String> {
    let tree = state
        .tree()
        .read()
        .map_err(|_| "树视图状态锁已损坏".to_string())?;
    Ok(tree.selected_node(repo_tree()))
}
