use crate::auth::JwtAuth;
use crate::config::GatewayConfig;
use crate::rate_limit::RateLimiter;
use crate::store::{InMemoryTradeStore, InMemoryUserStore, TradeStore, UserStore};
use market_data::PriceProvider;
use risk_engine::RiskEngine;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub engine: RiskEngine,
    pub rate_limiter: Arc<RateLimiter>,
    pub jwt: Arc<JwtAuth>,
    pub users: Arc<dyn UserStore>,
    pub trades: Arc<dyn TradeStore>,
    pub prices: Arc<dyn PriceProvider>,
}

impl AppState {
    /// In-memory stores sized from the config.
    pub fn new(config: &GatewayConfig, prices: Arc<dyn PriceProvider>) -> Self {
        Self {
            engine: RiskEngine::new(),
            rate_limiter: Arc::new(RateLimiter::in_memory(
                config.rate_limit_max_requests,
                config.rate_limit_window(),
            )),
            jwt: Arc::new(JwtAuth::new(&config.jwt_secret, config.jwt_expiry_hours)),
            users: Arc::new(InMemoryUserStore::new()),
            trades: Arc::new(InMemoryTradeStore::new()),
            prices,
        }
    }

    pub fn with_rate_limiter(mut self, rate_limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    pub fn with_user_store(mut self, users: Arc<dyn UserStore>) -> Self {
        self.users = users;
        self
    }

    pub fn with_trade_store(mut self, trades: Arc<dyn TradeStore>) -> Self {
        self.trades = trades;
        self
    }
}
