//! UseCase: 直近のペアリング記録取得処理

use std::sync::Arc;

use crate::domain::{MessageStore, PairingRecord};

use super::error::GetRecentPairingsError;

/// `limit` を省略したときの取得件数
pub const DEFAULT_RECENT_PAIRINGS_LIMIT: usize = 10;
/// 一度に取得できる最大件数
pub const MAX_RECENT_PAIRINGS_LIMIT: usize = 100;

/// 直近のペアリング記録取得のユースケース
pub struct GetRecentPairingsUseCase {
    store: Arc<dyn MessageStore>,
}

impl GetRecentPairingsUseCase {
    /// 新しい GetRecentPairingsUseCase を作成
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    /// ペアリング記録を新しい順に取得
    ///
    /// `limit` は 1..=100 に丸められます（省略時は 10）。
    pub async fn execute(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<PairingRecord>, GetRecentPairingsError> {
        let limit = limit
            .unwrap_or(DEFAULT_RECENT_PAIRINGS_LIMIT)
            .clamp(1, MAX_RECENT_PAIRINGS_LIMIT);
        Ok(self.store.list_recent_pairings(limit).await?)
    }
}
