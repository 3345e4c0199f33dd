use chrono::{DateTime, Utc};
use market_data::Quote;
use risk_engine::PortfolioSummary;
use serde::{Deserialize, Serialize};
use types::ids::{TradeId, UserId};
use types::risk::{RiskCalculation, RiskRequest};

use crate::auth::Role;
use crate::store::trades::TradeRecord;
use crate::store::users::User;

/// User-facing messages. The web client matches on these strings.
pub mod messages {
    pub const CALCULATION_OK: &str = "Cálculo realizado com sucesso";
    pub const INTERNAL_ERROR: &str = "Erro interno do servidor";
    pub const METHOD_NOT_ALLOWED: &str = "Método não permitido";
    pub const TOO_MANY_REQUESTS: &str = "Muitas requisições. Tente novamente mais tarde.";
    pub const INVALID_CREDENTIALS: &str = "Credenciais inválidas";
    pub const INVALID_BODY: &str = "Corpo da requisição inválido";
    pub const MISSING_TOKEN: &str = "Token de acesso não fornecido";
    pub const INVALID_TOKEN: &str = "Token inválido ou expirado";
    pub const ADMIN_ONLY: &str = "Acesso restrito a administradores";
    pub const INVALID_EMAIL: &str = "Email inválido";
    pub const WEAK_PASSWORD: &str = "A senha deve ter pelo menos 8 caracteres";
    pub const EMAIL_TAKEN: &str = "Email já cadastrado";
    pub const TRADE_SAVED: &str = "Operação salva com sucesso";
    pub const TRADE_DELETED: &str = "Operação removida com sucesso";
    pub const TRADE_NOT_FOUND: &str = "Operação não encontrada";
    pub const UNSUPPORTED_FORMAT: &str = "Formato de exportação não suportado";
    pub const MISSING_EXCHANGE: &str = "Parâmetro exchange é obrigatório";
    pub const PRICE_FEED_UNAVAILABLE: &str = "Serviço de cotações indisponível";
    pub const ROUTE_NOT_FOUND: &str = "Rota não encontrada";
}

#[derive(Debug, Clone, Serialize)]
pub struct CalculationResponse {
    pub success: bool,
    pub calculation: RiskCalculation,
    pub message: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveTradeRequest {
    #[serde(flatten)]
    pub request: RiskRequest,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeView {
    pub id: TradeId,
    pub created_at: DateTime<Utc>,
    pub calculation: RiskCalculation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<TradeRecord> for TradeView {
    fn from(record: TradeRecord) -> Self {
        Self {
            id: record.id,
            created_at: record.created_at,
            calculation: record.calculation,
            notes: record.notes,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TradeResponse {
    pub success: bool,
    pub trade: TradeView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TradeListResponse {
    pub success: bool,
    pub trades: Vec<TradeView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: UserInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserListResponse {
    pub success: bool,
    pub users: Vec<UserInfo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceQuery {
    pub exchange: Option<String>,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SymbolsQuery {
    pub exchange: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExchangesResponse {
    pub success: bool,
    pub exchanges: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SymbolsResponse {
    pub success: bool,
    pub exchange: String,
    pub symbols: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteResponse {
    pub success: bool,
    pub quote: Quote,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuotesResponse {
    pub success: bool,
    pub quotes: Vec<Quote>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: PortfolioSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_save_trade_request_flattens_calculation_fields() {
        let req: SaveTradeRequest = serde_json::from_value(json!({
            "exchange": "binance",
            "entryPrice": "100",
            "notes": "breakout retest"
        }))
        .unwrap();

        assert_eq!(req.request.exchange, Some(json!("binance")));
        assert_eq!(req.request.entry_price, Some(json!("100")));
        assert_eq!(req.notes.as_deref(), Some("breakout retest"));
    }
}
