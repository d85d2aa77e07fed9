//! # 仪表盘 fixture 服务
//!
//! 提供 Mission Control 视图的 mock 指标数据：统计卡片、周活动序列、
//! 语言构成和侧边栏的仓库计数。纯静态展示素材，没有任何计算或行为。

use crate::models::metrics::{ActivityPoint, DashboardData, LanguageShare, SystemMetric, Trend};

/// 已索引仓库数量（侧边栏展示用）
const REPOSITORY_COUNT: u32 = 51;

/// 返回仪表盘完整数据快照
pub fn dashboard_data() -> DashboardData {
    DashboardData {
        metrics: metrics(),
        activity: activity(),
        languages: languages(),
        repository_count: REPOSITORY_COUNT,
    }
}

/// 顶部统计卡片
fn metrics() -> Vec<SystemMetric> {
    vec![
        metric("Ethical Alignment", 98.2, "%", 2.4, Trend::Up),
        metric("Compute Load", 42.0, "TFLOPS", 0.0, Trend::Neutral),
        metric("Active Modules", 14.0, "of 15", -1.0, Trend::Down),
        metric("Collaborators", 24.0, "active", 3.0, Trend::Up),
    ]
}

/// 周活动序列（Empathy vs. Logic Output 面积图）
fn activity() -> Vec<ActivityPoint> {
    [
        ("Mon", 4, 85),
        ("Tue", 7, 88),
        ("Wed", 3, 82),
        ("Thu", 12, 91),
        ("Fri", 8, 94),
        ("Sat", 5, 89),
        ("Sun", 2, 87),
    ]
    .into_iter()
    .map(|(name, commits, empathy_score)| ActivityPoint {
        name: name.to_string(),
        commits,
        empathy_score,
    })
    .collect()
}

/// 语言构成（Code Composition 环形图）
fn languages() -> Vec<LanguageShare> {
    [
        ("TypeScript", 45, "#6366f1"),
        ("Python", 30, "#eab308"),
        ("Rust", 15, "#f97316"),
        ("C++", 10, "#64748b"),
    ]
    .into_iter()
    .map(|(name, value, color)| LanguageShare {
        name: name.to_string(),
        value,
        color: color.to_string(),
    })
    .collect()
}

fn metric(name: &str, value: f64, unit: &str, change: f64, trend: Trend) -> SystemMetric {
    SystemMetric {
        name: name.to_string(),
        value,
        unit: unit.to_string(),
        change,
        trend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_shape() {
        let data = dashboard_data();
        assert_eq!(data.metrics.len(), 4);
        assert_eq!(data.activity.len(), 7);
        assert_eq!(data.repository_count, 51);
    }

    #[test]
    fn test_language_shares_sum_to_hundred() {
        let total: u32 = dashboard_data().languages.iter().map(|l| l.value).sum();
        assert_eq!(total, 100);
    }
}
