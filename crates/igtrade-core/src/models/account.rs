use serde::{Deserialize, Serialize};

/// Body of a successful login. Kept alongside the tokens so a cached session
/// can still answer "which account am I on?" without a network call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    pub account_type: String,
    pub account_info: AccountBalance,
    pub currency_iso_code: String,
    pub currency_symbol: Option<String>,
    pub current_account_id: String,
    pub lightstreamer_endpoint: Option<String>,
    #[serde(default)]
    pub accounts: Vec<AccountSummary>,
    pub client_id: String,
    #[serde(default)]
    pub timezone_offset: i32,
    #[serde(default)]
    pub has_active_demo_accounts: bool,
    #[serde(default)]
    pub has_active_live_accounts: bool,
    #[serde(default)]
    pub trailing_stops_enabled: bool,
    pub rerouting_environment: Option<String>,
    #[serde(default)]
    pub dealing_enabled: bool,
}

impl AccountInfo {
    /// The account entry the session is currently dealing on
    pub fn current_account(&self) -> Option<&AccountSummary> {
        self.accounts
            .iter()
            .find(|a| a.account_id == self.current_account_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    pub balance: f64,
    pub deposit: f64,
    pub profit_loss: f64,
    pub available: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub account_id: String,
    pub account_name: String,
    #[serde(default)]
    pub preferred: bool,
    pub account_type: String,
}
