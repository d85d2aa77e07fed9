//! # 应用全局状态服务
//!
//! 定义 Tauri managed state（[`AppState`]），所有 command 函数通过
//! `State<'_, AppState>` 参数注入访问。包含：
//! - 对话会话（聊天记录 + 忙碌标志）
//! - 树视图状态（展开集合 + 单选）
//! - 提供方客户端槽位（惰性创建，可释放）
//!
//! ## 线程安全
//! 使用 `std::sync::RwLock` 保证多线程安全访问。
//! Tauri 的 command 可能在不同线程上并发执行；锁只在同步临界区内持有，
//! 绝不跨 await 点（流式驱动在锁外等待下一个片段）。
//!
//! ## 提供方生命周期
//! 客户端是显式对象：首次使用时从环境变量创建并缓存（创建失败不缓存，
//! 每次使用都重新在首次使用点抛出配置错误），重置对话时释放。
//! 不存在进程级隐藏单例。

use std::sync::RwLock;

use crate::services::chat::ChatSession;
use crate::services::provider::{ChatError, GeminiClient};
use crate::services::repository::repo_tree;
use crate::services::tree::TreeView;

/// 树视图初始展开深度：根节点默认展开，其余全部折叠
const INITIAL_TREE_DEPTH: usize = 1;

/// 应用全局状态
///
/// 通过 Tauri 的 `manage()` 方法注册，进程内唯一。
/// 所有字段独立加锁，避免不相关操作互相阻塞。
pub struct AppState {
    /// 对话会话状态
    chat: RwLock<ChatSession>,
    /// 树视图状态
    tree: RwLock<TreeView>,
    /// 提供方客户端槽位：None 表示尚未创建或已释放
    provider: RwLock<Option<GeminiClient>>,
}

impl AppState {
    /// 创建初始应用状态
    pub fn new() -> Self {
        Self {
            chat: RwLock::new(ChatSession::new()),
            tree: RwLock::new(TreeView::with_initial_depth(repo_tree(), INITIAL_TREE_DEPTH)),
            provider: RwLock::new(None),
        }
    }

    /// 对话会话状态的锁引用
    pub fn chat(&self) -> &RwLock<ChatSession> {
        &self.chat
    }

    /// 树视图状态的锁引用
    pub fn tree(&self) -> &RwLock<TreeView> {
        &self.tree
    }

    /// 取用提供方客户端（惰性创建）
    ///
    /// 已有实例时返回其克隆（克隆成本低廉，连接池共享），
    /// 避免调用方跨 await 持有状态锁。没有实例时尝试从环境变量创建：
    /// 成功则缓存并返回，失败则原样返回错误且**不缓存**失败结果，
    /// 这样用户补设环境变量后重启应用即可恢复能力。
    ///
    /// # 错误
    /// - `ChatError::Configuration` - 凭据缺失（首次使用处抛出）
    /// - `ChatError::Provider` - HTTP 客户端构建失败
    pub fn provider(&self) -> Result<GeminiClient, ChatError> {
        if let Ok(guard) = self.provider.read() {
            if let Some(client) = guard.as_ref() {
                return Ok(client.clone());
            }
        }

        let client = GeminiClient::from_env()?;
        if let Ok(mut guard) = self.provider.write() {
            *guard = Some(client.clone());
        }
        Ok(client)
    }

    /// 释放提供方客户端
    ///
    /// 重置对话时调用，下次使用会重新创建。
    pub fn dispose_provider(&self) {
        if let Ok(mut guard) = self.provider.write() {
            *guard = None;
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = AppState::new();

        let chat = state.chat().read().unwrap();
        assert_eq!(chat.transcript().len(), 1);
        assert!(!chat.busy());
        drop(chat);

        let tree = state.tree().read().unwrap();
        assert!(tree.is_expanded("root"));
        assert!(tree.selected_node(repo_tree()).is_none());
    }

    #[test]
    fn test_provider_slot_starts_empty_and_can_dispose() {
        let state = AppState::new();
        // 未创建时释放是无操作
        state.dispose_provider();
        assert!(state.provider.read().unwrap().is_none());
    }
}
