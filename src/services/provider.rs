//! # AI 提供方客户端服务
//!
//! 封装对 Gemini `streamGenerateContent` 接口（SSE 流式响应）的调用。
//! 提供方在这里被当作黑盒能力：提交一段提示词，按序返回文本片段，
//! 以序列终止或错误收尾。
//!
//! ## 生命周期设计
//! 客户端是显式构造、由调用方持有的对象（创建 → 使用 → 释放），
//! 不存在进程级隐藏单例。`AppState` 在首次使用时通过 [`GeminiClient::from_env`]
//! 惰性创建并缓存一个实例，重置对话时释放。
//!
//! ## 错误分类
//! 只有两类错误（[`ChatError`]）：
//! - `Configuration` - 凭据缺失/无效，能力不可用，在首次使用处抛出
//! - `Provider` - 能力可用后的请求或流中断失败
//!
//! 两类错误都在使用处被捕获并转换为带错误标记的聊天消息，不重试、不上抛。
//!
//! ## SSE 解析策略
//! - 响应体按 chunk 到达，chunk 边界与事件行边界无关，
//!   使用 `BytesMut` 缓冲区增量拼接、按换行切分完整行
//! - 数据行格式为 `data: {json}`，用 `serde_json::Value` 提取
//!   `candidates[0].content.parts[*].text`；解析失败的行静默跳过

use std::collections::VecDeque;
use std::fmt;
use std::pin::Pin;
use std::time::Duration;

use bytes::BytesMut;
use futures_util::stream::{Stream, StreamExt};
use serde_json::{Value, json};

use crate::models::message::{ChatMessage, Role};
use crate::services::chat::WELCOME_MESSAGE_ID;

/// 当前使用的模型标识
pub const MODEL_NAME: &str = "gemini-2.5-flash";

/// Gemini API 基础地址
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// 凭据来源环境变量名
const API_KEY_ENV: &str = "API_KEY";

/// 连接超时（秒）：仅限制建立连接，不限制流式响应总时长
/// （流一旦开始就跑到结束或出错，没有中途取消路径）
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// 采样温度，与原前端配置一致
const TEMPERATURE: f64 = 0.7;

/// 系统指令：定义 Agape 的人设与职责
const SYSTEM_INSTRUCTION: &str = "You are Agape, the central intelligence of the \
AgapeIntelligence repository. Your purpose is to provide benevolent, ethical, and \
highly logical assistance. You help users navigate the repository, understand the \
codebase, and explore concepts of ethical AI. Be concise, warm, and technically \
accurate.";

/// 判断凭据是否已配置（不触发客户端创建）
///
/// 设置视图的状态行据此渲染。只看环境变量是否非空，
/// 不校验凭据有效性——无效凭据会在首次请求时以提供方错误浮出。
pub fn credential_configured() -> bool {
    std::env::var(API_KEY_ENV)
        .map(|key| !key.trim().is_empty())
        .unwrap_or(false)
}

/// 对话能力的错误分类
///
/// 仅有的两类错误。两者都会在使用处被转换为用户可见的错误聊天消息，
/// 绝不导致应用崩溃。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// 配置错误：环境变量中没有可用凭据，对话能力不可用
    Configuration(String),
    /// 提供方错误：请求被拒绝或流式响应中断
    Provider(String),
}

impl fmt::Display for ChatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "配置错误: {}", msg),
            Self::Provider(msg) => write!(f, "提供方错误: {}", msg),
        }
    }
}

/// 文本片段流：每一步产出一个 `Result<片段, ChatError>`
///
/// 对应设计决策：用拉取式迭代器替代原实现的惰性异步生成器，
/// 由单一消费方（流式驱动）逐步拉取。流是惰性、有限、不可重启的。
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send>>;

/// Gemini 流式客户端
///
/// 持有一个 `reqwest::Client`（内部连接池可复用）和凭据。
/// 克隆成本低廉，`AppState` 借此在不跨 await 持锁的前提下取用客户端。
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// 从进程环境变量构造客户端
    ///
    /// 读取 `API_KEY` 环境变量。缺失或为空白时返回 `Configuration` 错误，
    /// 由调用方决定如何呈现（记录警告 + 错误聊天消息），而非硬崩溃。
    ///
    /// # 错误
    /// - `ChatError::Configuration` - 环境变量缺失或为空
    /// - `ChatError::Provider` - HTTP 客户端构建失败
    pub fn from_env() -> Result<Self, ChatError> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                ChatError::Configuration(format!("环境变量 {} 未设置", API_KEY_ENV))
            })?;
        Self::new(api_key)
    }

    /// 用给定凭据构造客户端
    ///
    /// # 错误
    /// HTTP 客户端构建失败时返回 `Provider` 错误
    pub fn new(api_key: String) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ChatError::Provider(format!("构建 HTTP 客户端失败: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            model: MODEL_NAME.to_string(),
        })
    }

    /// 发起一次流式生成请求
    ///
    /// 将完整对话历史（多轮上下文）发给提供方，返回文本片段流。
    /// 欢迎语、错误消息和空文本占位消息在构建请求时被过滤掉，
    /// 因此传入 `begin` 之后的完整聊天记录即可。
    ///
    /// # 参数
    /// - `conversation` - 当前完整聊天记录（最后一条非空 user 消息即本次提示词）
    ///
    /// # 返回值
    /// HTTP 请求成功建立后返回片段流；流内部的每一项可能是片段或中断错误
    ///
    /// # 错误
    /// 网络请求失败或提供方返回非 2xx 状态时返回 `Provider` 错误
    pub async fn stream_message(
        &self,
        conversation: &[ChatMessage],
    ) -> Result<FragmentStream, ChatError> {
        let url = format!("{}/{}:streamGenerateContent?alt=sse", API_BASE, self.model);
        let body = build_request_body(conversation);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Provider(format!("请求提供方失败: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            // 错误响应体通常包含提供方给出的失败原因，一并带回便于排查
            let detail = response.text().await.unwrap_or_default();
            return Err(ChatError::Provider(format!(
                "提供方返回错误状态 {}: {}",
                status.as_u16(),
                detail
            )));
        }

        Ok(sse_fragment_stream(response.bytes_stream()))
    }
}

/// 构建 `streamGenerateContent` 请求体
///
/// 从聊天记录构建多轮 `contents`，并附加系统指令和采样配置。
///
/// # 过滤规则
/// - 欢迎语（id 为 "welcome"）是纯界面元素，不属于提供方会话历史
/// - 错误消息不回传（其文本是本地错误文案，不是模型输出）
/// - 空白文本消息跳过（流式占位消息在请求构建时总是空的）
fn build_request_body(conversation: &[ChatMessage]) -> Value {
    let contents: Vec<Value> = conversation
        .iter()
        .filter(|msg| {
            msg.id != WELCOME_MESSAGE_ID && !msg.is_error && !msg.text.trim().is_empty()
        })
        .map(|msg| {
            let role = match msg.role {
                Role::User => "user",
                Role::Model => "model",
            };
            json!({
                "role": role,
                "parts": [{ "text": msg.text }]
            })
        })
        .collect();

    json!({
        "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
        "contents": contents,
        "generationConfig": { "temperature": TEMPERATURE }
    })
}

/// SSE 流装配状态
///
/// 跨 chunk 维护的缓冲与待发队列。一个 chunk 可能包含多个事件行，
/// 一个事件行也可能被拆进多个 chunk，因此解析必须是增量的。
struct SseState {
    /// 底层响应体字节流
    body: Pin<Box<dyn Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send>>,
    /// 未凑成完整行的字节缓冲
    buffer: BytesMut,
    /// 已解析出但尚未被下游拉走的文本片段
    pending: VecDeque<String>,
    /// 底层流已结束（正常或出错后都不再拉取）
    finished: bool,
}

impl SseState {
    /// 从缓冲区切出所有完整行并解析出片段
    fn drain_buffer(&mut self) {
        for line in take_complete_lines(&mut self.buffer) {
            if let Some(text) = parse_sse_line(&line) {
                self.pending.push_back(text);
            }
        }
    }

    /// 底层流结束后处理缓冲区尾部（最后一行可能没有换行符）
    fn drain_tail(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let tail = String::from_utf8_lossy(&self.buffer).to_string();
        self.buffer.clear();
        if let Some(text) = parse_sse_line(tail.trim_end_matches('\r')) {
            self.pending.push_back(text);
        }
    }
}

/// 将 HTTP 响应体字节流转换为文本片段流
///
/// 产出顺序与提供方发送顺序一致。底层传输中断时产出一个
/// `Provider` 错误项并终止；正常结束时直接终止。
fn sse_fragment_stream(
    body: impl Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
) -> FragmentStream {
    let state = SseState {
        body: Box::pin(body),
        buffer: BytesMut::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    Box::pin(futures_util::stream::unfold(state, |mut state| async move {
        loop {
            // 先清空待发队列，再考虑继续拉取底层流
            if let Some(text) = state.pending.pop_front() {
                return Some((Ok(text), state));
            }
            if state.finished {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    state.buffer.extend_from_slice(&chunk);
                    state.drain_buffer();
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((
                        Err(ChatError::Provider(format!("流式响应中断: {}", e))),
                        state,
                    ));
                }
                None => {
                    state.finished = true;
                    state.drain_tail();
                }
            }
        }
    }))
}

/// 从缓冲区切出所有以换行符结尾的完整行
///
/// 返回的行已去除行尾的 `\n` 和 `\r`；不完整的尾部字节留在缓冲区中
/// 等待下一个 chunk 补齐。
fn take_complete_lines(buffer: &mut BytesMut) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let raw = buffer.split_to(pos + 1);
        let line = String::from_utf8_lossy(&raw[..pos]);
        lines.push(line.trim_end_matches('\r').to_string());
    }
    lines
}

/// 解析单个 SSE 事件行，提取文本片段
///
/// 只认 `data:` 前缀的行；空行、注释行和其他字段行返回 None。
/// JSON 解析失败的行静默跳过（与解析器的容错策略一致），
/// 不含文本内容的 chunk（如纯 usage 统计）同样返回 None。
fn parse_sse_line(line: &str) -> Option<String> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }

    let value: Value = serde_json::from_str(payload).ok()?;
    extract_fragment_text(&value)
}

/// 从一个响应 chunk 的 JSON 中提取文本
///
/// 取 `candidates[0].content.parts` 下所有 `text` 字段的拼接。
/// 提供方版本差异导致的字段缺失一律按"无文本"处理。
fn extract_fragment_text(chunk: &Value) -> Option<String> {
    let parts = chunk
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;

    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
        .collect();

    if text.is_empty() { None } else { Some(text) }
}
