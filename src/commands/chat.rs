//! # 对话 Tauri Commands
//!
//! 提供对话功能的 Tauri command 处理函数：
//! - `send_prompt` - 提交提示词并通过 Channel 推送流式事件
//! - `get_transcript` - 读取完整聊天记录快照
//! - `reset_chat` - 重置会话并释放提供方客户端
//! - `provider_status` - 查询提供方配置状态（设置视图）
//! - `export_transcript` - 导出聊天记录为 Markdown/JSON 字符串
//!
//! 错误呈现约定：配置错误和提供方错误都不会让 command 返回 Err，
//! 而是转换为带错误标记的聊天消息经 `Failed` 事件送达前端；
//! command 层的 Err 只用于状态锁损坏这类编程错误。

use tauri::State;
use tauri::ipc::Channel;

use crate::models::message::{ChatMessage, StreamEvent};
use crate::models::settings::ProviderStatus;
use crate::services::chat::{self, SubmitRejection};
use crate::services::export;
use crate::services::provider::{self, MODEL_NAME};
use crate::services::state::AppState;

/// 导出文档的固定标题
const EXPORT_TITLE: &str = "Agape 对话导出";

/// 提交一个提示词，流式接收模型回复
///
/// 接受的提交会立即在聊天记录中追加 user 消息和空文本的 model 占位消息，
/// 随后通过 `on_event` Channel 依次推送 `Started`、零或多个 `Fragment`、
/// 以及恰好一个 `Completed` 或 `Failed`。
///
/// # 拒绝规则（均为无操作，返回 false，不推送任何事件）
/// - 已有流式请求在途（忙碌标志，不排队）
/// - 提示词为空或仅含空白字符
///
/// # 参数
/// - `prompt` - 用户输入原文
/// - `on_event` - 流式事件推送通道
/// - `state` - Tauri managed state
///
/// # 返回值
/// true 表示提交被接受（包括之后以错误收尾的情形），false 表示被拒绝
///
/// # 错误
/// 仅在状态锁损坏时返回错误
#[tauri::command]
pub async fn send_prompt(
    prompt: String,
    on_event: Channel<StreamEvent>,
    state: State<'_, AppState>,
) -> Result<bool, String> {
    // 校验与占位消息创建在同一个临界区内完成，保证至多一个在途请求
    let begun = {
        let mut session = state
            .chat()
            .write()
            .map_err(|_| "对话状态锁已损坏".to_string())?;
        session.begin(&prompt)
    };

    let (user, model) = match begun {
        Ok(pair) => pair,
        Err(SubmitRejection::Busy) => {
            log::debug!("忽略提交：已有流式请求在途");
            return Ok(false);
        }
        Err(SubmitRejection::EmptyPrompt) => {
            log::debug!("忽略提交：提示词为空白");
            return Ok(false);
        }
    };

    let mut publish = |event: StreamEvent| {
        // 前端窗口关闭等场景下推送可能失败，只记录不中断流的消费
        if let Err(e) = on_event.send(event) {
            log::warn!("推送流式事件失败: {}", e);
        }
    };

    let model_id = model.id.clone();
    publish(StreamEvent::Started { user, model });

    // 历史快照含刚追加的 user 消息；空文本占位消息在请求构建时被过滤
    let conversation = {
        let session = state
            .chat()
            .read()
            .map_err(|_| "对话状态锁已损坏".to_string())?;
        session.transcript()
    };

    // 首次使用处惰性创建客户端：凭据缺失在这里以配置错误浮出，
    // 转换为错误聊天消息而非崩溃
    let client = match state.provider() {
        Ok(client) => client,
        Err(error) => {
            log::warn!("对话能力不可用: {}", error);
            chat::fail_exchange(state.chat(), &model_id, &mut publish);
            return Ok(true);
        }
    };

    let fragments = match client.stream_message(&conversation).await {
        Ok(stream) => stream,
        Err(error) => {
            log::warn!("建立流式请求失败: {}", error);
            chat::fail_exchange(state.chat(), &model_id, &mut publish);
            return Ok(true);
        }
    };

    chat::pump_fragments(state.chat(), &model_id, fragments, publish).await;

    Ok(true)
}

/// 读取完整聊天记录快照
///
/// 前端在挂载对话视图时调用一次，之后依靠流式事件增量更新。
///
/// # 错误
/// 仅在状态锁损坏时返回错误
#[tauri::command]
pub async fn get_transcript(state: State<'_, AppState>) -> Result<Vec<ChatMessage>, String> {
    let session = state
        .chat()
        .read()
        .map_err(|_| "对话状态锁已损坏".to_string())?;
    Ok(session.transcript())
}

/// 重置会话
///
/// 清空聊天记录（重新种入欢迎消息）并释放提供方客户端。
/// 有流式请求在途时拒绝并返回 false。
///
/// # 错误
/// 仅在状态锁损坏时返回错误
#[tauri::command]
pub async fn reset_chat(state: State<'_, AppState>) -> Result<bool, String> {
    let cleared = {
        let mut session = state
            .chat()
            .write()
            .map_err(|_| "对话状态锁已损坏".to_string())?;
        session.reset()
    };

    if cleared {
        state.dispose_provider();
    } else {
        log::debug!("忽略重置：已有流式请求在途");
    }

    Ok(cleared)
}

/// 查询提供方配置状态
///
/// 设置视图的 "API Key Status" 行据此渲染。凭据值本身不出 Rust 进程。
#[tauri::command]
pub async fn provider_status() -> ProviderStatus {
    ProviderStatus {
        configured: provider::credential_configured(),
        model: MODEL_NAME.to_string(),
    }
}

/// 导出聊天记录
///
/// # 参数
/// - `format` - "markdown" 或 "json"
///
/// # 返回值
/// 导出内容字符串，前端通过 dialog/fs 插件落盘
///
/// # 错误
/// 未知格式或序列化失败时返回错误
#[tauri::command]
pub async fn export_transcript(
    format: String,
    state: State<'_, AppState>,
) -> Result<String, String> {
    let transcript = {
        let session = state
            .chat()
            .read()
            .map_err(|_| "对话状态锁已损坏".to_string())?;
        session.transcript()
    };

    match format.as_str() {
        "markdown" => Ok(export::to_markdown(&transcript, EXPORT_TITLE)),
        "json" => export::to_json(&transcript),
        other => Err(format!("未知导出格式: {}", other)),
    }
}
