//! # 仪表盘指标数据模型
//!
//! 定义了仪表盘视图（Mission Control）所需的统计卡片、周活动序列和
//! 语言构成数据结构。全部是静态 mock 数据的载体，无任何行为。
//!
//! 对应前端 TypeScript 中的 `SystemMetric` 接口以及 `Dashboard.tsx`
//! 中的 `MOCK_ACTIVITY_DATA`、`LANGUAGE_DATA` 常量结构。

use serde::Serialize;

/// 指标趋势方向
///
/// 序列化为小写字符串，与前端的 `'up' | 'down' | 'neutral'` 一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Neutral,
}

/// 系统指标数据结构（统计卡片）
///
/// 对应前端 TypeScript 接口：
/// ```typescript
/// interface SystemMetric {
///   name: string;
///   value: number;
///   unit: string;
///   change: number;
///   trend: 'up' | 'down' | 'neutral';
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemMetric {
    /// 指标名称（如 "Ethical Alignment"）
    pub name: String,
    /// 指标数值
    pub value: f64,
    /// 数值单位（如 "%"、"TFLOPS"）
    pub unit: String,
    /// 相对上一周期的变化量
    pub change: f64,
    /// 趋势方向：决定前端箭头样式
    pub trend: Trend,
}

/// 周活动数据点
///
/// 面积图（Empathy vs. Logic Output）的单个横轴采样点。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPoint {
    /// 横轴标签：星期几的缩写（"Mon" ... "Sun"）
    pub name: String,
    /// 当天提交数
    pub commits: u32,
    /// 当天共情评分
    pub empathy_score: u32,
}

/// 语言构成份额
///
/// 环形图（Code Composition）的单个扇区。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageShare {
    /// 语言名称
    pub name: String,
    /// 占比数值（百分比，各项相加为 100）
    pub value: u32,
    /// 扇区颜色（十六进制，前端直接使用）
    pub color: String,
}

/// 仪表盘完整数据快照（IPC 一次性返回）
///
/// 一次 `get_dashboard` 调用返回仪表盘渲染所需的全部数据，
/// 避免前端发起多次 IPC 往返。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    /// 顶部统计卡片（固定 4 张）
    pub metrics: Vec<SystemMetric>,
    /// 周活动序列（固定 7 天）
    pub activity: Vec<ActivityPoint>,
    /// 语言构成（各项相加为 100）
    pub languages: Vec<LanguageShare>,
    /// 已索引仓库数量：侧边栏展示用的静态数字
    pub repository_count: u32,
}
