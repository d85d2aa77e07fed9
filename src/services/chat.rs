//! # 对话会话服务
//!
//! 聊天记录模型与流式累加状态机，整个应用仅有的"核心逻辑"之一。
//!
//! ## 职责划分
//! - [`ChatSession`] - 纯同步状态机：持有有序消息列表和忙碌标志，
//!   提供 begin / apply_fragment / complete / fail 四步生命周期操作。
//!   所有可测性质都落在这个类型上，不依赖网络和异步运行时。
//! - [`pump_fragments`] - 异步驱动：逐项拉取片段流，在锁内更新会话、
//!   在锁外发布事件。锁绝不跨 await 持有。
//!
//! ## 并发约定
//! 同一会话同时至多一个在途流式请求，由忙碌标志在 `begin` 的临界区内
//! 检查并置位强制保证（拒绝而非排队）。没有取消路径：流一旦开始，
//! 跑到正常结束或出错为止，两种收尾都会释放忙碌标志。

use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{Stream, StreamExt};

use crate::models::message::{ChatMessage, Role, StreamEvent};
use crate::services::provider::ChatError;
use crate::utils::time::{now_iso8601, now_millis};

/// 欢迎消息的固定 id：会话种子消息，不参与提供方历史
pub const WELCOME_MESSAGE_ID: &str = "welcome";

/// 欢迎消息文案
pub const WELCOME_TEXT: &str = "Hello. I am Agape, the operational intelligence for \
this repository. How may I assist you in navigating the code or understanding our \
ethical frameworks today?";

/// 流式响应失败时的固定用户可见文案
///
/// 配置错误和提供方错误统一使用这一条文案替换在途的 model 消息文本
pub const STREAM_ERROR_TEXT: &str = "I encountered an error connecting to the \
intelligence core. Please verify your API Key configuration.";

/// 进程内消息 id 单调计数器
///
/// 与 epoch 毫秒数组合生成消息 id，保证同一毫秒内连续创建的
/// user/model 消息对也能获得互不相同的稳定标识
static MESSAGE_SEQ: AtomicU64 = AtomicU64::new(0);

/// 生成一个新的消息 id
///
/// 格式：`{epoch 毫秒}-{单调序号}`
fn next_message_id() -> String {
    let seq = MESSAGE_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", now_millis(), seq)
}

/// 提交被拒绝的原因
///
/// 两种拒绝都是无操作：聊天记录长度不变，不发出任何请求。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    /// 已有流式请求在途（忙碌标志置位）
    Busy,
    /// 提示词为空或仅含空白字符
    EmptyPrompt,
}

/// 对话会话状态机
///
/// 持有完整聊天记录（会话期间只增不删）和忙碌标志。
/// 新会话以一条欢迎消息作为种子。
pub struct ChatSession {
    /// 有序消息列表：界面按此顺序渲染
    messages: Vec<ChatMessage>,
    /// 忙碌标志：true 表示有流式请求在途，新提交一律拒绝
    busy: bool,
}

impl ChatSession {
    /// 创建新会话，种入欢迎消息
    pub fn new() -> Self {
        Self {
            messages: vec![ChatMessage {
                id: WELCOME_MESSAGE_ID.to_string(),
                role: Role::Model,
                text: WELCOME_TEXT.to_string(),
                timestamp: now_iso8601(),
                is_error: false,
            }],
            busy: false,
        }
    }

    /// 当前是否有流式请求在途
    pub fn busy(&self) -> bool {
        self.busy
    }

    /// 返回完整聊天记录的快照
    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.messages.clone()
    }

    /// 开始一次对话交换
    ///
    /// 校验通过后在一个临界区内完成三件事：追加 user 消息、
    /// 追加空文本的 model 占位消息、置位忙碌标志。
    ///
    /// # 参数
    /// - `prompt` - 用户输入原文（保留原始空白，仅用 trim 判断是否为空）
    ///
    /// # 返回值
    /// 新建的 (user 消息, model 占位消息) 快照对
    ///
    /// # 错误
    /// - `SubmitRejection::Busy` - 已有请求在途
    /// - `SubmitRejection::EmptyPrompt` - 提示词为空白
    pub fn begin(&mut self, prompt: &str) -> Result<(ChatMessage, ChatMessage), SubmitRejection> {
        if self.busy {
            return Err(SubmitRejection::Busy);
        }
        if prompt.trim().is_empty() {
            return Err(SubmitRejection::EmptyPrompt);
        }

        let user = ChatMessage {
            id: next_message_id(),
            role: Role::User,
            text: prompt.to_string(),
            timestamp: now_iso8601(),
            is_error: false,
        };
        let model = ChatMessage {
            id: next_message_id(),
            role: Role::Model,
            text: String::new(),
            timestamp: now_iso8601(),
            is_error: false,
        };

        self.messages.push(user.clone());
        self.messages.push(model.clone());
        self.busy = true;

        Ok((user, model))
    }

    /// 将一个文本片段累加到指定消息上
    ///
    /// 消息文本只增不减：每次累加后的文本都是上一次的前缀扩展。
    ///
    /// # 返回值
    /// 累加后的消息快照；id 不存在时返回 None
    pub fn apply_fragment(&mut self, message_id: &str, fragment: &str) -> Option<ChatMessage> {
        let message = self.find_mut(message_id)?;
        message.text.push_str(fragment);
        Some(message.clone())
    }

    /// 正常收尾：冻结消息文本并释放忙碌标志
    ///
    /// # 返回值
    /// 最终状态的消息快照；id 不存在时返回 None（忙碌标志仍会释放）
    pub fn complete(&mut self, message_id: &str) -> Option<ChatMessage> {
        self.busy = false;
        let message = self.find_mut(message_id)?;
        Some(message.clone())
    }

    /// 异常收尾：替换为固定错误文案、置错误标记并释放忙碌标志
    ///
    /// 不保留已累加的部分文本——半截回复比一条明确的错误提示更误导人。
    ///
    /// # 返回值
    /// 最终状态的消息快照；id 不存在时返回 None（忙碌标志仍会释放）
    pub fn fail(&mut self, message_id: &str) -> Option<ChatMessage> {
        self.busy = false;
        let message = self.find_mut(message_id)?;
        message.text = STREAM_ERROR_TEXT.to_string();
        message.is_error = true;
        Some(message.clone())
    }

    /// 重置会话：清空聊天记录并重新种入欢迎消息
    ///
    /// 有流式请求在途时拒绝（返回 false），
    /// 在途的 model 消息只能由流式驱动收尾。
    pub fn reset(&mut self) -> bool {
        if self.busy {
            return false;
        }
        *self = Self::new();
        true
    }

    /// 按 id 查找消息的可变引用
    fn find_mut(&mut self, message_id: &str) -> Option<&mut ChatMessage> {
        self.messages.iter_mut().find(|m| m.id == message_id)
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// 流式驱动：消费片段流并推进会话状态机
///
/// 逐项拉取 `fragments`：
/// - `Ok(片段)` → 锁内累加到 model 消息，锁外发布 `Fragment` 事件
///   （事件携带完整累计文本，观察者看到的值构成前缀链）
/// - `Err(错误)` → 锁内替换为固定错误文案，发布 `Failed` 事件，
///   停止消费（不重试），忙碌标志已释放
/// - 流正常耗尽 → 发布 `Completed` 事件，忙碌标志已释放
///
/// 锁的持有范围仅限单次状态更新，绝不跨 await。
///
/// # 参数
/// - `session` - 会话状态（与命令层共享）
/// - `message_id` - `begin` 返回的 model 占位消息 id
/// - `fragments` - 提供方的片段流（或测试中的模拟流）
/// - `publish` - 事件发布回调（命令层接 `tauri::ipc::Channel`）
pub async fn pump_fragments<S>(
    session: &RwLock<ChatSession>,
    message_id: &str,
    mut fragments: S,
    mut publish: impl FnMut(StreamEvent),
) where
    S: Stream<Item = Result<String, ChatError>> + Unpin,
{
    while let Some(item) = fragments.next().await {
        match item {
            Ok(fragment) => {
                let snapshot = match session.write() {
                    Ok(mut guard) => guard.apply_fragment(message_id, &fragment),
                    Err(_) => None,
                };
                if let Some(message) = snapshot {
                    publish(StreamEvent::Fragment {
                        message_id: message.id,
                        text: message.text,
                    });
                }
            }
            Err(error) => {
                log::warn!("流式响应失败: {}", error);
                fail_exchange(session, message_id, &mut publish);
                return;
            }
        }
    }

    let snapshot = match session.write() {
        Ok(mut guard) => guard.complete(message_id),
        Err(_) => None,
    };
    if let Some(message) = snapshot {
        publish(StreamEvent::Completed { message });
    }
}

/// 异常收尾的公共路径
///
/// `pump_fragments` 的中断分支和命令层的"流未能建立"分支共用：
/// 将在途消息替换为固定错误文案并发布 `Failed` 事件。
pub fn fail_exchange(
    session: &RwLock<ChatSession>,
    message_id: &str,
    publish: &mut impl FnMut(StreamEvent),
) {
    let snapshot = match session.write() {
        Ok(mut guard) => guard.fail(message_id),
        Err(_) => None,
    };
    if let Some(message) = snapshot {
        publish(StreamEvent::Failed { message });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    /// 将片段结果列表装配成测试用的 Unpin 片段流
    fn fragment_stream(
        items: Vec<Result<String, ChatError>>,
    ) -> impl Stream<Item = Result<String, ChatError>> + Unpin {
        stream::iter(items)
    }

    #[test]
    fn test_new_session_seeds_welcome() {
        let session = ChatSession::new();
        let transcript = session.transcript();

        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].id, WELCOME_MESSAGE_ID);
        assert_eq!(transcript[0].role, Role::Model);
        assert_eq!(transcript[0].text, WELCOME_TEXT);
        assert!(!session.busy());
    }

    #[test]
    fn test_begin_appends_user_and_placeholder() {
        let mut session = ChatSession::new();
        let (user, model) = session.begin("hello").unwrap();

        assert_eq!(user.role, Role::User);
        assert_eq!(user.text, "hello");
        assert_eq!(model.role, Role::Model);
        assert_eq!(model.text, "");
        assert_ne!(user.id, model.id);
        assert!(session.busy());

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].id, user.id);
        assert_eq!(transcript[2].id, model.id);
    }

    #[test]
    fn test_begin_rejects_empty_and_whitespace_prompt() {
        let mut session = ChatSession::new();

        assert!(matches!(session.begin(""), Err(SubmitRejection::EmptyPrompt)));
        assert!(matches!(
            session.begin("   \n\t"),
            Err(SubmitRejection::EmptyPrompt)
        ));
        // 无操作：聊天记录长度不变，忙碌标志未置位
        assert_eq!(session.transcript().len(), 1);
        assert!(!session.busy());
    }

    #[test]
    fn test_begin_rejects_while_busy() {
        let mut session = ChatSession::new();
        session.begin("first").unwrap();
        let len_before = session.transcript().len();

        assert!(matches!(session.begin("second"), Err(SubmitRejection::Busy)));
        assert_eq!(session.transcript().len(), len_before);
    }

    #[test]
    fn test_fragment_accumulation_is_prefix_growing() {
        let mut session = ChatSession::new();
        let (_, model) = session.begin("hello").unwrap();

        let mut previous = String::new();
        for fragment in ["Hi", " there", ", friend"] {
            let snapshot = session.apply_fragment(&model.id, fragment).unwrap();
            assert!(snapshot.text.starts_with(&previous));
            previous = snapshot.text;
        }
        assert_eq!(previous, "Hi there, friend");
    }

    #[test]
    fn test_fail_replaces_text_and_clears_busy() {
        let mut session = ChatSession::new();
        let (_, model) = session.begin("hello").unwrap();
        session.apply_fragment(&model.id, "partial").unwrap();

        let failed = session.fail(&model.id).unwrap();
        assert_eq!(failed.text, STREAM_ERROR_TEXT);
        assert!(failed.is_error);
        assert!(!session.busy());

        // 失败后可以立刻提交新的提示词
        assert!(session.begin("again").is_ok());
    }

    #[test]
    fn test_reset_rejected_while_busy() {
        let mut session = ChatSession::new();
        session.begin("hello").unwrap();

        assert!(!session.reset());
        assert_eq!(session.transcript().len(), 3);
    }

    #[test]
    fn test_reset_reseeds_welcome() {
        let mut session = ChatSession::new();
        let (_, model) = session.begin("hello").unwrap();
        session.complete(&model.id).unwrap();

        assert!(session.reset());
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].id, WELCOME_MESSAGE_ID);
    }

    #[tokio::test]
    async fn test_pump_accumulates_all_fragments_in_order() {
        let session = RwLock::new(ChatSession::new());
        let model_id = {
            let (_, model) = session.write().unwrap().begin("hello").unwrap();
            model.id
        };

        let mut events = Vec::new();
        let fragments = fragment_stream(vec![
            Ok("Hi".to_string()),
            Ok(" there".to_string()),
        ]);
        pump_fragments(&session, &model_id, fragments, |event| events.push(event)).await;

        // 端到端性质：transcript = [welcome, user:"hello", model:"Hi there"]
        let guard = session.read().unwrap();
        let transcript = guard.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[0].id, WELCOME_MESSAGE_ID);
        assert_eq!(transcript[1].text, "hello");
        assert_eq!(transcript[2].text, "Hi there");
        assert!(!transcript[2].is_error);
        assert!(!guard.busy());

        // 发布序列：Fragment 的文本构成前缀链，最后一个事件是 Completed
        let mut previous = String::new();
        for event in &events {
            if let StreamEvent::Fragment { text, .. } = event {
                assert!(text.starts_with(&previous));
                previous = text.clone();
            }
        }
        assert_eq!(previous, "Hi there");
        assert!(matches!(
            events.last(),
            Some(StreamEvent::Completed { message }) if message.text == "Hi there"
        ));
    }

    #[tokio::test]
    async fn test_pump_failure_mid_stream() {
        let session = RwLock::new(ChatSession::new());
        let model_id = {
            let (_, model) = session.write().unwrap().begin("hello").unwrap();
            model.id
        };

        let mut events = Vec::new();
        let fragments = fragment_stream(vec![
            Ok("par".to_string()),
            Err(ChatError::Provider("connection reset".to_string())),
            // 错误之后的片段不会被消费（驱动在错误处停止）
            Ok("tial".to_string()),
        ]);
        pump_fragments(&session, &model_id, fragments, |event| events.push(event)).await;

        let guard = session.read().unwrap();
        let transcript = guard.transcript();
        assert_eq!(transcript[2].text, STREAM_ERROR_TEXT);
        assert!(transcript[2].is_error);
        assert!(!guard.busy());
        drop(guard);

        assert!(matches!(events.last(), Some(StreamEvent::Failed { .. })));

        // 忙碌标志已释放：新的提交立即被接受
        assert!(session.write().unwrap().begin("next").is_ok());
    }

    #[tokio::test]
    async fn test_pump_empty_stream_completes_with_empty_text() {
        let session = RwLock::new(ChatSession::new());
        let model_id = {
            let (_, model) = session.write().unwrap().begin("hello").unwrap();
            model.id
        };

        let mut events = Vec::new();
        pump_fragments(&session, &model_id, fragment_stream(vec![]), |event| {
            events.push(event)
        })
        .await;

        let guard = session.read().unwrap();
        assert_eq!(guard.transcript()[2].text, "");
        assert!(!guard.busy());
        assert!(matches!(events.last(), Some(StreamEvent::Completed { .. })));
    }

    #[test]
    fn test_message_ids_are_unique() {
        let mut session = ChatSession::new();
        let (user_a, model_a) = session.begin("one").unwrap();
        session.complete(&model_a.id).unwrap();
        let (user_b, model_b) = session.begin("two").unwrap();

        let ids = [&user_a.id, &model_a.id, &user_b.id, &model_b.id];
        for (i, a) in ids.iter().enumerate() {
            for b in ids.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
