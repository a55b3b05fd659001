//! Sweeps move a wallet's accrued balance to an external payment method.
//!
//! A sweep config describes where and when the money goes; each sweep is one
//! accrual period of a wallet.

use chrono::{DateTime, Utc};
use http::Method;
use serde::{Deserialize, Serialize};

use super::{AmountDecimal, paths};
use crate::client::{
    CallArg, Endpoint, MoovClient, MoovError, ResultExt, count, json_body, list_or_error,
    object_or_error, query, skip,
};

/// Whether a sweep config is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepConfigStatus {
    /// Sweeps are scheduled.
    Enabled,
    /// No new sweep is scheduled.
    Disabled,
    /// A status this client does not know.
    #[serde(other)]
    Unknown,
}

/// A sweep config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepConfig {
    /// Identifier.
    #[serde(rename = "sweepConfigID")]
    pub sweep_config_id: String,
    /// Wallet being swept.
    #[serde(rename = "walletID")]
    pub wallet_id: String,
    /// Current status.
    pub status: SweepConfigStatus,
    /// Payment method receiving a positive balance.
    #[serde(rename = "pushPaymentMethodID")]
    pub push_payment_method_id: String,
    /// Payment method covering a negative balance.
    #[serde(rename = "pullPaymentMethodID")]
    pub pull_payment_method_id: String,
    /// Override of the statement descriptor of sweep transfers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_descriptor: Option<String>,
    /// Balance kept in the wallet, as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_balance: Option<String>,
    /// Fields that cannot be updated.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locked_fields: Vec<String>,
    /// Creation time.
    pub created_on: DateTime<Utc>,
    /// Last update time.
    pub updated_on: DateTime<Utc>,
}

/// Request body of [`MoovClient::create_sweep_config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSweepConfig {
    /// Wallet to sweep.
    #[serde(rename = "walletID")]
    pub wallet_id: String,
    /// Initial status.
    pub status: SweepConfigStatus,
    /// Payment method receiving a positive balance.
    #[serde(rename = "pushPaymentMethodID")]
    pub push_payment_method_id: String,
    /// Payment method covering a negative balance.
    #[serde(rename = "pullPaymentMethodID")]
    pub pull_payment_method_id: String,
    /// Override of the statement descriptor of sweep transfers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_descriptor: Option<String>,
    /// Balance kept in the wallet, e.g. `"12.34"`; `"0.00"` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_balance: Option<String>,
}

/// Request body of [`MoovClient::update_sweep_config`]; only present fields change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSweepConfig {
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SweepConfigStatus>,
    /// New push payment method.
    #[serde(
        rename = "pushPaymentMethodID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub push_payment_method_id: Option<String>,
    /// New pull payment method.
    #[serde(
        rename = "pullPaymentMethodID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub pull_payment_method_id: Option<String>,
    /// New statement descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_descriptor: Option<String>,
    /// New minimum balance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_balance: Option<String>,
}

/// Status of a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweepStatus {
    /// The wallet balance is accruing.
    Accruing,
    /// The sweep cannot proceed without user action.
    ActionRequired,
    /// Canceled.
    Canceled,
    /// Closed without money movement.
    Closed,
    /// The sweep transfer failed.
    Failed,
    /// The sweep transfer completed.
    Paid,
    /// A status this client does not know.
    #[serde(other)]
    Unknown,
}

impl SweepStatus {
    /// The wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accruing => "accruing",
            Self::ActionRequired => "action-required",
            Self::Canceled => "canceled",
            Self::Closed => "closed",
            Self::Failed => "failed",
            Self::Paid => "paid",
            Self::Unknown => "unknown",
        }
    }
}

/// A sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sweep {
    /// Identifier.
    #[serde(rename = "sweepID")]
    pub sweep_id: String,
    /// Current status.
    pub status: SweepStatus,
    /// Start of the accrual period.
    pub accrual_started_on: DateTime<Utc>,
    /// End of the accrual period, once closed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accrual_ended_on: Option<DateTime<Utc>>,
    /// Net wallet activity over the period.
    pub accrued_amount: AmountDecimal,
    /// Transfers not yet settled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_transfers_amount: Option<AmountDecimal>,
    /// Balance carried over from the previous sweep.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub residual_balance: Option<AmountDecimal>,
    /// Transfer paying the sweep out, once initiated.
    #[serde(rename = "transferID", default, skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<String>,
    /// Amount of that transfer, as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_amount: Option<String>,
    /// Statement descriptor of that transfer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement_descriptor: Option<String>,
}

/// Filter accepted by [`MoovClient::list_sweeps`].
///
/// ```rust
/// use moov_client::{ListSweepsFilter, SweepStatus};
///
/// let filters = [
///     ListSweepsFilter::status(SweepStatus::Accruing),
///     ListSweepsFilter::skip(0),
///     ListSweepsFilter::count(10),
/// ];
/// ```
#[derive(Debug, Clone)]
pub struct ListSweepsFilter(CallArg);

impl ListSweepsFilter {
    /// Only sweeps with this status.
    pub fn status(status: SweepStatus) -> Self {
        Self(query("status", status.as_str()))
    }

    /// Only sweeps with this statement descriptor.
    pub fn statement_descriptor(statement_descriptor: impl Into<String>) -> Self {
        let statement_descriptor: String = statement_descriptor.into();
        Self(query("statementDescriptor", statement_descriptor))
    }

    /// Number of sweeps to skip.
    pub fn skip(value: u32) -> Self {
        Self(skip(value))
    }

    /// Maximum number of sweeps to return.
    pub fn count(value: u32) -> Self {
        Self(count(value))
    }
}

impl From<ListSweepsFilter> for CallArg {
    fn from(value: ListSweepsFilter) -> Self {
        value.0
    }
}

impl MoovClient {
    /// Lists the sweep configs of an account.
    ///
    /// # Errors
    ///
    /// Fails with the call or resolution error, in the `listing sweep configs` context.
    pub async fn list_sweep_configs(&self, account_id: &str) -> Result<Vec<SweepConfig>, MoovError> {
        let endpoint = Endpoint::new(Method::GET, paths::SWEEP_CONFIGS, [account_id]);

        self.call_http(endpoint, [])
            .await
            .and_then(list_or_error)
            .context("listing sweep configs")
    }

    /// Retrieves a sweep config.
    ///
    /// # Errors
    ///
    /// Fails with the call or resolution error, in the `getting sweep config` context.
    pub async fn get_sweep_config(
        &self,
        account_id: &str,
        sweep_config_id: &str,
    ) -> Result<SweepConfig, MoovError> {
        let endpoint = Endpoint::new(
            Method::GET,
            paths::SWEEP_CONFIG,
            [account_id, sweep_config_id],
        );

        self.call_http(endpoint, [])
            .await
            .and_then(object_or_error)
            .context("getting sweep config")
    }

    /// Creates a sweep config for a wallet of the account.
    ///
    /// # Errors
    ///
    /// Fails with the call or resolution error, in the `creating sweep config` context.
    pub async fn create_sweep_config(
        &self,
        account_id: &str,
        create: &CreateSweepConfig,
    ) -> Result<SweepConfig, MoovError> {
        let endpoint = Endpoint::new(Method::POST, paths::SWEEP_CONFIGS, [account_id]);

        self.call_http(endpoint, [json_body(create)])
            .await
            .and_then(object_or_error)
            .context("creating sweep config")
    }

    /// Updates the present fields of a sweep config.
    ///
    /// # Errors
    ///
    /// Fails with the call or resolution error, in the `updating sweep config` context.
    pub async fn update_sweep_config(
        &self,
        account_id: &str,
        sweep_config_id: &str,
        update: &UpdateSweepConfig,
    ) -> Result<SweepConfig, MoovError> {
        let endpoint = Endpoint::new(
            Method::PATCH,
            paths::SWEEP_CONFIG,
            [account_id, sweep_config_id],
        );

        self.call_http(endpoint, [json_body(update)])
            .await
            .and_then(object_or_error)
            .context("updating sweep config")
    }

    /// Lists the sweeps of a wallet, in server order.
    ///
    /// # Errors
    ///
    /// Fails with the call or resolution error, in the `listing sweeps` context.
    pub async fn list_sweeps<I>(
        &self,
        account_id: &str,
        wallet_id: &str,
        filters: I,
    ) -> Result<Vec<Sweep>, MoovError>
    where
        I: IntoIterator<Item = ListSweepsFilter>,
    {
        let endpoint = Endpoint::new(Method::GET, paths::SWEEPS, [account_id, wallet_id]);

        self.call_http(endpoint, filters.into_iter().map(CallArg::from))
            .await
            .and_then(list_or_error)
            .context("listing sweeps")
    }

    /// Retrieves a sweep.
    ///
    /// # Errors
    ///
    /// Fails with the call or resolution error, in the `getting sweep` context.
    pub async fn get_sweep(
        &self,
        account_id: &str,
        wallet_id: &str,
        sweep_id: &str,
    ) -> Result<Sweep, MoovError> {
        let endpoint = Endpoint::new(
            Method::GET,
            paths::SWEEP,
            [account_id, wallet_id, sweep_id],
        );

        self.call_http(endpoint, [])
            .await
            .and_then(object_or_error)
            .context("getting sweep")
    }
}

#[cfg(test)]
mod tests {
    use http::{HeaderMap, StatusCode};

    use super::*;
    use crate::client::{CallBuilder, RawResponse};

    fn query_for(filters: Vec<ListSweepsFilter>) -> String {
        let endpoint = Endpoint::new(Method::GET, paths::SWEEPS, ["acc", "wal"]);
        let call = CallBuilder::prepare(endpoint, filters.into_iter().map(CallArg::from))
            .expect("should prepare");
        call.query_string().expect("encodable")
    }

    #[test]
    fn test_filters_compose_with_pagination() {
        let query = query_for(vec![
            ListSweepsFilter::status(SweepStatus::ActionRequired),
            ListSweepsFilter::statement_descriptor("ACME"),
            ListSweepsFilter::skip(0),
            ListSweepsFilter::count(10),
        ]);

        insta::assert_snapshot!(query, @"status=action-required&statementDescriptor=ACME&skip=0&count=10");
    }

    #[test]
    fn test_filter_order_does_not_change_the_parameter_set() {
        let parse = |query: &str| {
            let mut pairs: Vec<(String, String)> =
                serde_urlencoded::from_str(query).expect("decodable");
            pairs.sort();
            pairs
        };

        let first = query_for(vec![
            ListSweepsFilter::status(SweepStatus::Accruing),
            ListSweepsFilter::count(10),
            ListSweepsFilter::skip(0),
        ]);
        let second = query_for(vec![
            ListSweepsFilter::skip(0),
            ListSweepsFilter::count(10),
            ListSweepsFilter::status(SweepStatus::Accruing),
        ]);

        assert_eq!(parse(&first), parse(&second));
    }

    #[test]
    fn test_update_sweep_config_serializes_present_fields_only() {
        let update = UpdateSweepConfig {
            status: Some(SweepConfigStatus::Disabled),
            minimum_balance: Some("10.00".to_string()),
            ..UpdateSweepConfig::default()
        };

        let json = serde_json::to_string(&update).expect("serializable");

        insta::assert_snapshot!(json, @r#"{"status":"disabled","minimumBalance":"10.00"}"#);
    }

    #[test]
    fn test_sweep_decoding() {
        let json = r#"{
            "sweepID": "swp-1",
            "status": "action-required",
            "accrualStartedOn": "2024-05-01T00:00:00Z",
            "accruedAmount": { "currency": "usd", "valueDecimal": "-12.50" },
            "statementDescriptor": "ACME"
        }"#;

        let sweep: Sweep = serde_json::from_str(json).expect("valid sweep");

        assert_eq!(sweep.status, SweepStatus::ActionRequired);
        assert_eq!(sweep.accrued_amount.value_decimal, "-12.50");
        assert_eq!(sweep.transfer_id, None);
    }

    #[test]
    fn test_sweep_list_tolerates_unknown_status() {
        let body = r#"[
            {
                "sweepID": "swp-1",
                "status": "accruing",
                "accrualStartedOn": "2024-05-01T00:00:00Z",
                "accruedAmount": { "currency": "usd", "valueDecimal": "1.00" }
            },
            {
                "sweepID": "swp-2",
                "status": "on-hold",
                "accrualStartedOn": "2024-04-01T00:00:00Z",
                "accruedAmount": { "currency": "usd", "valueDecimal": "2.00" }
            }
        ]"#;

        let sweeps: Vec<Sweep> =
            list_or_error(RawResponse::new(StatusCode::OK, HeaderMap::new(), body))
                .expect("should decode");

        let statuses: Vec<_> = sweeps.iter().map(|sweep| sweep.status).collect();
        assert_eq!(statuses, [SweepStatus::Accruing, SweepStatus::Unknown]);
    }

    #[test]
    fn test_sweep_config_tolerates_unknown_status() {
        let status: SweepConfigStatus =
            serde_json::from_str(r#""paused""#).expect("should decode");

        assert_eq!(status, SweepConfigStatus::Unknown);
    }

    #[test]
    fn test_sweep_status_wire_names() {
        for status in [
            SweepStatus::Accruing,
            SweepStatus::ActionRequired,
            SweepStatus::Canceled,
            SweepStatus::Closed,
            SweepStatus::Failed,
            SweepStatus::Paid,
            SweepStatus::Unknown,
        ] {
            let json = serde_json::to_string(&status).expect("serializable");
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }
}
