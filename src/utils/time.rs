//! # 时间工具函数
//!
//! 提供消息时间戳所需的时间格式化工具：
//! - 获取当前时间的 ISO 8601 字符串
//! - 获取当前时间的 Unix epoch 毫秒数（用于生成消息 id）
//!
//! 由于不引入额外的时间库（如 chrono），全部使用标准库手动转换。

use std::time::{SystemTime, UNIX_EPOCH};

/// 获取当前时间的 ISO 8601 格式字符串（UTC）
///
/// # 返回值
/// 形如 `2026-08-05T12:34:56.789Z` 的字符串
pub fn now_iso8601() -> String {
    system_time_to_iso8601(SystemTime::now())
}

/// 获取当前时间的 Unix epoch 毫秒数
///
/// 用于生成消息 id 的时间前缀。系统时钟早于 epoch 的极端情况下返回 0。
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// 将 `SystemTime` 转换为 ISO 8601 格式字符串
///
/// 格式：`YYYY-MM-DDTHH:MM:SS.sssZ`（UTC 时间）
///
/// # 参数
/// - `time` - 要转换的系统时间
///
/// # 返回值
/// ISO 8601 格式的时间字符串；系统时间早于 Unix epoch 时返回 epoch 起点
pub fn system_time_to_iso8601(time: SystemTime) -> String {
    match time.duration_since(UNIX_EPOCH) {
        Ok(duration) => {
            let total_secs = duration.as_secs();
            let millis = duration.subsec_millis();

            // 手动计算日期时间各分量（UTC）
            let days = total_secs / 86400;
            let time_of_day = total_secs % 86400;
            let hours = time_of_day / 3600;
            let minutes = (time_of_day % 3600) / 60;
            let seconds = time_of_day % 60;

            // 从天数计算年月日（基于 1970-01-01）
            let (year, month, day) = days_to_date(days);

            format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
                year, month, day, hours, minutes, seconds, millis
            )
        }
        Err(_) => {
            // 如果系统时间早于 Unix epoch（不太可能），返回 epoch
            "1970-01-01T00:00:00.000Z".to_string()
        }
    }
}

/// 将自 1970-01-01 以来的天数转换为 (年, 月, 日)
///
/// 使用公历日期计算算法，正确处理闰年。
/// 算法来源：Howard Hinnant，http://howardhinnant.github.io/date_algorithms.html
///
/// # 参数
/// - `days_since_epoch` - 自 Unix epoch (1970-01-01) 以来的天数
///
/// # 返回值
/// (year, month, day) 元组
fn days_to_date(days_since_epoch: u64) -> (u64, u64, u64) {
    // 将 epoch 偏移到公元 0 年 3 月 1 日以简化闰年计算
    let z = days_since_epoch + 719468;
    let era = z / 146097;
    let doe = z - era * 146097; // day of era [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365; // year of era [0, 399]
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // day of year [0, 365]
    let mp = (5 * doy + 2) / 153; // month index [0, 11]
    let d = doy - (153 * mp + 2) / 5 + 1; // day [1, 31]
    let m = if mp < 10 { mp + 3 } else { mp - 9 }; // month [1, 12]
    let y = if m <= 2 { y + 1 } else { y };

    (y, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_epoch_start() {
        let formatted = system_time_to_iso8601(UNIX_EPOCH);
        assert_eq!(formatted, "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_known_instant() {
        // 2024-02-29T12:00:00.500Z（闰日）对应的 epoch 秒数
        let time = UNIX_EPOCH + Duration::from_millis(1_709_208_000_500);
        assert_eq!(system_time_to_iso8601(time), "2024-02-29T12:00:00.500Z");
    }

    #[test]
    fn test_year_boundary() {
        // 2023-12-31T23:59:59.999Z
        let time = UNIX_EPOCH + Duration::from_millis(1_704_067_199_999);
        assert_eq!(system_time_to_iso8601(time), "2023-12-31T23:59:59.999Z");
    }
}
