//! # 提供方配置状态数据模型
//!
//! 定义了设置视图所需的提供方状态结构体。凭据本身只存在于进程环境变量中，
//! 绝不通过 IPC 传给前端，前端只能看到"是否已配置"这一布尔结论。

use serde::Serialize;

/// 提供方配置状态
///
/// 设置视图的 "API Key Status" 行和对话视图的在线指示灯都由此驱动。
///
/// 对应前端 TypeScript 接口：
/// ```typescript
/// interface ProviderStatus {
///   configured: boolean;
///   model: string;
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    /// 是否已配置凭据：环境变量 `API_KEY` 非空即为 true。
    /// false 时对话能力不可用，首次使用时会收到错误消息而非崩溃
    pub configured: bool,

    /// 当前使用的模型标识（固定为 gemini-2.5-flash）
    pub model: String,
}
