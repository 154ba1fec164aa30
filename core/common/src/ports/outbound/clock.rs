//! 時刻取得 Outbound ポート
//!
//! ドメインの `updated_at` / `created_at` はこの trait 経由で取得する。テストでは固定時刻を注入する。

use chrono::{DateTime, TimeZone, Utc};

/// 時刻取得の抽象
///
/// 実装は `common::adapter::StdClock` やテスト用の固定時刻など。
pub trait Clock: Send + Sync {
    /// 現在時刻をミリ秒（Unix epoch）で返す
    fn now_ms(&self) -> u64;

    /// 現在時刻を UTC の DateTime で返す
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.now_ms() as i64)
            .single()
            .unwrap_or_default()
    }
}
