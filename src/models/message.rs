//! # 对话消息数据模型
//!
//! 定义了对话消息（ChatMessage）、消息角色（Role）和流式事件（StreamEvent）
//! 等 Rust 结构体，对应前端 TypeScript 中的 `ChatMessage` 接口。
//!
//! 消息的一生：用户提交时创建 user 消息和空文本的 model 占位消息；
//! 流式响应期间 model 消息的 `text` 字段只增不减；会话期间消息永不删除，
//! 应用重启后全部重置（无持久化）。

use serde::{Deserialize, Serialize};

/// 消息角色枚举
///
/// 对话中只有两种角色：用户（user）和模型（model）。
/// 序列化为小写字符串，与前端的 `'user' | 'model'` 字面量联合类型一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 用户消息：由输入框提交产生
    User,
    /// 模型消息：欢迎语、流式回复或错误提示
    Model,
}

/// 对话消息数据结构
///
/// 这是对话功能最核心的数据结构，表示聊天记录中的一条消息。
/// 消息身份由 `id` 唯一确定且创建后不变；流式响应期间 Rust 端
/// 通过 `id` 定位 model 占位消息并原地累加文本。
///
/// 对应前端 TypeScript 接口：
/// ```typescript
/// interface ChatMessage {
///   id: string;
///   role: 'user' | 'model';
///   text: string;
///   timestamp: Date;
///   isError?: boolean;
/// }
/// ```
///
/// 注意：前端的 `timestamp` 是 `Date` 类型，在 Tauri IPC 传输时
/// 序列化为 ISO 8601 字符串，前端接收后需要转换为 `Date` 对象。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// 消息唯一标识：欢迎语固定为 "welcome"，
    /// 其余消息由 epoch 毫秒数 + 进程内单调计数器组合生成
    pub id: String,

    /// 消息角色：user 或 model
    pub role: Role,

    /// 消息文本：user 消息创建后不变；
    /// model 消息在流式响应期间单调增长，结束后冻结
    pub text: String,

    /// 消息创建时间：ISO 8601 格式字符串（UTC）
    pub timestamp: String,

    /// 错误标记：流式响应失败时置为 true，
    /// 此时 `text` 为固定的用户可见错误文案
    pub is_error: bool,
}

/// 流式事件数据结构
///
/// `send_prompt` 命令通过 `tauri::ipc::Channel` 推送的事件载荷。
/// 对应设计决策：将原实现的惰性异步生成器替换为显式的推送接口
/// （onFragment / onComplete / onError），由前端 reducer 按事件类型更新界面。
///
/// 事件序列约定：`Started` 恰好一次，随后零或多次 `Fragment`，
/// 最后恰好一次 `Completed` 或 `Failed`。
///
/// `Fragment.text` 携带的是 model 消息的**完整累计文本**而非增量片段，
/// 观察者看到的值因此构成前缀链（每次发布都是上一次的前缀扩展），
/// 前端无需自行拼接，也不会出现回退。
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StreamEvent {
    /// 提交被接受：user 消息和空文本的 model 占位消息已加入聊天记录
    #[serde(rename_all = "camelCase")]
    Started {
        /// 新建的用户消息
        user: ChatMessage,
        /// 新建的 model 占位消息（text 为空字符串）
        model: ChatMessage,
    },
    /// 收到一个文本片段：model 消息文本已累加
    #[serde(rename_all = "camelCase")]
    Fragment {
        /// 正在累加的 model 消息 id
        message_id: String,
        /// 累加后的完整文本（前缀链）
        text: String,
    },
    /// 流正常结束：model 消息文本已冻结
    #[serde(rename_all = "camelCase")]
    Completed {
        /// 最终状态的 model 消息
        message: ChatMessage,
    },
    /// 流异常中断：model 消息已替换为固定错误文案并置错误标记
    #[serde(rename_all = "camelCase")]
    Failed {
        /// 最终状态的 model 消息（is_error 为 true）
        message: ChatMessage,
    },
}
