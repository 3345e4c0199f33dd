use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use types::ids::{TradeId, UserId};
use types::risk::RiskCalculation;

use super::StoreError;

/// A calculation a user chose to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeRecord {
    pub id: TradeId,
    pub user_id: UserId,
    pub calculation: RiskCalculation,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TradeRecord {
    pub fn new(user_id: UserId, calculation: RiskCalculation, notes: Option<String>) -> Self {
        Self {
            id: TradeId::new(),
            user_id,
            calculation,
            notes: notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            created_at: Utc::now(),
        }
    }
}

/// Per-user trade journal. Every read and delete is scoped to the owner.
#[async_trait]
pub trait TradeStore: Send + Sync {
    async fn insert(&self, record: TradeRecord) -> Result<(), StoreError>;

    /// Owner's trades, newest first.
    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<TradeRecord>, StoreError>;

    async fn get(&self, user_id: &UserId, id: &TradeId) -> Result<Option<TradeRecord>, StoreError>;

    /// Returns whether a record was removed.
    async fn delete(&self, user_id: &UserId, id: &TradeId) -> Result<bool, StoreError>;
}

#[derive(Debug, Default)]
pub struct InMemoryTradeStore {
    trades: DashMap<TradeId, TradeRecord>,
}

impl InMemoryTradeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TradeStore for InMemoryTradeStore {
    async fn insert(&self, record: TradeRecord) -> Result<(), StoreError> {
        if self.trades.contains_key(&record.id) {
            return Err(StoreError::Duplicate(record.id.to_string()));
        }
        self.trades.insert(record.id, record);
        Ok(())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<TradeRecord>, StoreError> {
        let mut records: Vec<TradeRecord> = self
            .trades
            .iter()
            .filter(|entry| entry.value().user_id == *user_id)
            .map(|entry| entry.value().clone())
            .collect();
        records.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(records)
    }

    async fn get(&self, user_id: &UserId, id: &TradeId) -> Result<Option<TradeRecord>, StoreError> {
        Ok(self
            .trades
            .get(id)
            .filter(|entry| entry.value().user_id == *user_id)
            .map(|entry| entry.value().clone()))
    }

    async fn delete(&self, user_id: &UserId, id: &TradeId) -> Result<bool, StoreError> {
        Ok(self
            .trades
            .remove_if(id, |_, record| record.user_id == *user_id)
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use risk_engine::RiskEngine;
    use serde_json::json;

    fn calculation() -> RiskCalculation {
        let request = serde_json::from_value(json!({
            "exchange": "binance",
            "symbol": "BTCUSDT",
            "direction": "LONG",
            "entryPrice": 100,
            "stopLoss": 90,
            "accountSize": 10000,
            "riskPercent": 2
        }))
        .unwrap();
        RiskEngine::new().evaluate(&request).unwrap()
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_newest_first() {
        let store = InMemoryTradeStore::new();
        let alice = UserId::new();
        let bob = UserId::new();

        let mut older = TradeRecord::new(alice, calculation(), None);
        older.created_at = Utc::now() - Duration::minutes(5);
        let newer = TradeRecord::new(alice, calculation(), Some("  scalp ".into()));
        let other = TradeRecord::new(bob, calculation(), None);

        store.insert(older.clone()).await.unwrap();
        store.insert(newer.clone()).await.unwrap();
        store.insert(other).await.unwrap();

        let listed = store.list_for_user(&alice).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newer.id);
        assert_eq!(listed[0].notes.as_deref(), Some("scalp"));
        assert_eq!(listed[1].id, older.id);
    }

    #[tokio::test]
    async fn test_get_and_delete_require_owner() {
        let store = InMemoryTradeStore::new();
        let owner = UserId::new();
        let stranger = UserId::new();
        let record = TradeRecord::new(owner, calculation(), None);
        let id = record.id;
        store.insert(record).await.unwrap();

        assert!(store.get(&stranger, &id).await.unwrap().is_none());
        assert!(!store.delete(&stranger, &id).await.unwrap());
        assert!(store.get(&owner, &id).await.unwrap().is_some());

        assert!(store.delete(&owner, &id).await.unwrap());
        assert!(store.get(&owner, &id).await.unwrap().is_none());
        assert!(!store.delete(&owner, &id).await.unwrap());
    }

    #[test]
    fn test_blank_notes_dropped() {
        let record = TradeRecord::new(UserId::new(), calculation(), Some("   ".into()));
        assert_eq!(record.notes, None);
    }
}
