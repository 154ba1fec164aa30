//! UUID v4 で ID を生成する IdGenerator の標準実装

use crate::ports::outbound::IdGenerator;
use uuid::Uuid;

/// 下書き memory など、クライアント側で採番する ID に使う
#[derive(Debug, Clone, Default)]
pub struct StdIdGenerator;

impl IdGenerator for StdIdGenerator {
    fn next_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
