//! ID 生成 Outbound ポート
//!
//! クライアント側で作る下書き memory の ID に使う。テストでは連番を返す実装を渡せる。

/// 一意な ID（UUID 文字列）を生成する抽象（Outbound ポート）
pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}
