//! # 聊天记录导出服务
//!
//! 将当前聊天记录导出为 Markdown 或 JSON 格式的字符串。
//! 字符串经 IPC 返回前端，由前端通过 dialog/fs 插件落盘。
//!
//! ## 导出策略
//! - **Markdown**：逐条输出角色、时间戳和文本；错误消息附加中断说明
//! - **JSON**：保留消息的完整结构，美化输出

use crate::models::message::{ChatMessage, Role};

/// 将聊天记录导出为 Markdown 格式字符串
///
/// # 参数
/// - `messages` - 完整聊天记录
/// - `title` - 文档标题
pub fn to_markdown(messages: &[ChatMessage], title: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("# {}", title));
    lines.push(String::new());

    // 导出时间：使用 SystemTime 计算 UTC 时间，避免依赖 chrono
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    lines.push(format!("导出时间: (UTC epoch: {})", now));
    lines.push(String::new());
    lines.push("---".into());
    lines.push(String::new());

    for message in messages {
        let role_label = match message.role {
            Role::User => "User",
            Role::Model => "Agape",
        };
        lines.push(format!("## {} ({})", role_label, message.timestamp));
        lines.push(String::new());
        lines.push(message.text.clone());
        if message.is_error {
            lines.push(String::new());
            lines.push("> 此回复因提供方错误而中断。".into());
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// 将聊天记录导出为美化 JSON 字符串
///
/// # 错误
/// 序列化失败时返回错误信息
pub fn to_json(messages: &[ChatMessage]) -> Result<String, String> {
    serde_json::to_string_pretty(messages).map_err(|e| format!("序列化聊天记录失败: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::chat::{ChatSession, STREAM_ERROR_TEXT};

    #[test]
    fn test_markdown_contains_roles_and_text() {
        let mut session = ChatSession::new();
        let (_, model) = session.begin("hello").unwrap();
        session.apply_fragment(&model.id, "Hi there").unwrap();
        session.complete(&model.id).unwrap();

        let markdown = to_markdown(&session.transcript(), "Agape 对话导出");

        assert!(markdown.starts_with("# Agape 对话导出"));
        assert!(markdown.contains("## User"));
        assert!(markdown.contains("## Agape"));
        assert!(markdown.contains("hello"));
        assert!(markdown.contains("Hi there"));
        assert!(!markdown.contains("中断"));
    }

    #[test]
    fn test_markdown_marks_error_messages() {
        let mut session = ChatSession::new();
        let (_, model) = session.begin("hello").unwrap();
        session.fail(&model.id).unwrap();

        let markdown = to_markdown(&session.transcript(), "导出");
        assert!(markdown.contains(STREAM_ERROR_TEXT));
        assert!(markdown.contains("此回复因提供方错误而中断"));
    }

    #[test]
    fn test_json_round_trips_message_count() {
        let session = ChatSession::new();
        let json = to_json(&session.transcript()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 1);
        // camelCase 字段名与前端类型一致
        assert!(parsed[0].get("isError").is_some());
    }
}
