use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use http::Method;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Amount, paths};
use crate::client::{
    CallArg, Endpoint, MoovClient, MoovError, Outcome, ResultExt, count, idempotency_key,
    json_body, list_or_error, object_or_error, outcome_or_error, query, skip, timeout,
    wait_for_rail_response,
};

/// Lifecycle status of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    /// Created, not yet submitted.
    Created,
    /// Submitted to the payment rail.
    Pending,
    /// Funds moved.
    Completed,
    /// The rail rejected the transfer.
    Failed,
    /// Funds were returned.
    Reversed,
    /// Waiting for funds.
    Queued,
    /// Canceled before completion.
    Canceled,
    /// A status this client does not know.
    #[serde(other)]
    Unknown,
}

impl TransferStatus {
    /// The wire representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Reversed => "reversed",
            Self::Queued => "queued",
            Self::Canceled => "canceled",
            Self::Unknown => "unknown",
        }
    }
}

/// Request body of [`MoovClient::create_transfer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransfer {
    /// Where the money comes from.
    pub source: CreateTransferSource,
    /// Where the money goes.
    pub destination: CreateTransferDestination,
    /// How much is moved.
    pub amount: Amount,
    /// Fee charged by the facilitator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facilitator_fee: Option<FacilitatorFee>,
    /// Free text description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Free-form key/value pairs.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: IndexMap<String, String>,
}

impl CreateTransfer {
    /// Creates a transfer request between two payment methods.
    pub fn new(
        source_payment_method_id: impl Into<String>,
        destination_payment_method_id: impl Into<String>,
        amount: Amount,
    ) -> Self {
        Self {
            source: CreateTransferSource {
                payment_method_id: source_payment_method_id.into(),
                transfer_id: None,
            },
            destination: CreateTransferDestination {
                payment_method_id: destination_payment_method_id.into(),
            },
            amount,
            facilitator_fee: None,
            description: String::new(),
            metadata: IndexMap::new(),
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Source of a new transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTransferSource {
    /// Payment method debited.
    #[serde(rename = "paymentMethodID")]
    pub payment_method_id: String,
    /// Transfer whose funds are used, for transfer chaining.
    #[serde(rename = "transferID", default, skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<String>,
}

/// Destination of a new transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTransferDestination {
    /// Payment method credited.
    #[serde(rename = "paymentMethodID")]
    pub payment_method_id: String,
}

/// Fee charged by the facilitator, either as a total or as a markup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacilitatorFee {
    /// Total fee in minor units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<i64>,
    /// Total fee as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_decimal: Option<String>,
    /// Markup on top of the platform fee, in minor units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup: Option<i64>,
    /// Markup as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markup_decimal: Option<String>,
}

/// A transfer, as returned once it is fully materialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    /// Identifier.
    #[serde(rename = "transferID")]
    pub transfer_id: String,
    /// Creation time.
    pub created_on: DateTime<Utc>,
    /// Completion time, once completed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_on: Option<DateTime<Utc>>,
    /// Current status.
    pub status: TransferStatus,
    /// Why the transfer failed, for failed transfers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    /// Amount moved.
    pub amount: Amount,
    /// Free text description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Free-form key/value pairs.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: IndexMap<String, String>,
    /// Debited side.
    pub source: TransferEndpoint,
    /// Credited side.
    pub destination: TransferEndpoint,
    /// Fee charged by the facilitator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facilitator_fee: Option<FacilitatorFee>,
    /// Platform fee in minor units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moov_fee: Option<i64>,
    /// Platform fee as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moov_fee_decimal: Option<String>,
    /// Group shared by related transfers.
    #[serde(rename = "groupID", default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
    /// Amount refunded so far.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refunded_amount: Option<Amount>,
}

/// Source or destination of an existing transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferEndpoint {
    /// Payment method used.
    #[serde(rename = "paymentMethodID")]
    pub payment_method_id: String,
    /// Kind of payment method, e.g. `moov-wallet` or `card-payment`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method_type: Option<String>,
    /// Owner of the payment method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<TransferAccount>,
}

/// Account taking part in a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferAccount {
    /// Account identifier.
    #[serde(rename = "accountID")]
    pub account_id: String,
    /// Contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Name shown to the counterparty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Handle on a transfer the platform accepted but has not finished processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferStarted {
    /// Identifier, usable with [`MoovClient::get_transfer`].
    #[serde(rename = "transferID")]
    pub transfer_id: String,
    /// Status at acceptance time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TransferStatus>,
    /// Creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_on: Option<DateTime<Utc>>,
}

/// Option accepted by [`MoovClient::create_transfer`].
#[derive(Debug, Clone)]
pub struct CreateTransferOption(CallArg);

impl CreateTransferOption {
    /// Waits for the payment rail, so the transfer completes synchronously when the rail allows it.
    pub fn wait_for_rail_response() -> Self {
        Self(wait_for_rail_response())
    }

    /// Replaces the generated idempotency key.
    pub fn idempotency_key(key: impl Into<String>) -> Self {
        Self(idempotency_key(key))
    }

    /// Sets the deadline of this call.
    pub fn timeout(duration: Duration) -> Self {
        Self(timeout(duration))
    }
}

impl From<CreateTransferOption> for CallArg {
    fn from(value: CreateTransferOption) -> Self {
        value.0
    }
}

/// Filter accepted by [`MoovClient::list_transfers`].
#[derive(Debug, Clone)]
pub struct ListTransfersFilter(CallArg);

impl ListTransfersFilter {
    /// Only transfers with this status.
    pub fn status(status: TransferStatus) -> Self {
        Self(query("status", status.as_str()))
    }

    /// Only transfers using this payment method.
    pub fn payment_method_id(payment_method_id: impl Into<String>) -> Self {
        let payment_method_id: String = payment_method_id.into();
        Self(query("paymentMethodID", payment_method_id))
    }

    /// Only transfers created at or after this instant.
    pub fn start_date_time(start: DateTime<Utc>) -> Self {
        Self(query(
            "startDateTime",
            start.to_rfc3339_opts(SecondsFormat::Secs, true),
        ))
    }

    /// Only transfers created before this instant.
    pub fn end_date_time(end: DateTime<Utc>) -> Self {
        Self(query("endDateTime", end.to_rfc3339_opts(SecondsFormat::Secs, true)))
    }

    /// Number of transfers to skip.
    pub fn skip(value: u32) -> Self {
        Self(skip(value))
    }

    /// Maximum number of transfers to return.
    pub fn count(value: u32) -> Self {
        Self(count(value))
    }
}

impl From<ListTransfersFilter> for CallArg {
    fn from(value: ListTransfersFilter) -> Self {
        value.0
    }
}

impl MoovClient {
    /// Moves money between two payment methods.
    ///
    /// Every call carries an `X-Idempotency-Key`, a fresh UUID unless
    /// [`CreateTransferOption::idempotency_key`] is given. Depending on the payment
    /// rails the platform either completes the transfer right away or accepts it
    /// for later processing; the [`Outcome`] tells which.
    ///
    /// # Errors
    ///
    /// Fails with the call or resolution error, in the `creating transfer` context.
    pub async fn create_transfer<I>(
        &self,
        partner_account_id: &str,
        create: &CreateTransfer,
        options: I,
    ) -> Result<Outcome<Transfer, TransferStarted>, MoovError>
    where
        I: IntoIterator<Item = CreateTransferOption>,
    {
        let endpoint = Endpoint::new(Method::POST, paths::TRANSFERS, [partner_account_id]);
        let args = [
            idempotency_key(Uuid::new_v4().to_string()),
            json_body(create),
        ]
        .into_iter()
        .chain(options.into_iter().map(CallArg::from));

        self.call_http(endpoint, args)
            .await
            .and_then(outcome_or_error)
            .context("creating transfer")
    }

    /// Retrieves a transfer.
    ///
    /// # Errors
    ///
    /// Fails with the call or resolution error, in the `getting transfer` context.
    pub async fn get_transfer(
        &self,
        partner_account_id: &str,
        transfer_id: &str,
    ) -> Result<Transfer, MoovError> {
        let endpoint = Endpoint::new(
            Method::GET,
            paths::TRANSFER,
            [partner_account_id, transfer_id],
        );

        self.call_http(endpoint, [])
            .await
            .and_then(object_or_error)
            .context("getting transfer")
    }

    /// Lists the transfers of an account, in server order.
    ///
    /// # Errors
    ///
    /// Fails with the call or resolution error, in the `listing transfers` context.
    pub async fn list_transfers<I>(
        &self,
        partner_account_id: &str,
        filters: I,
    ) -> Result<Vec<Transfer>, MoovError>
    where
        I: IntoIterator<Item = ListTransfersFilter>,
    {
        let endpoint = Endpoint::new(Method::GET, paths::TRANSFERS, [partner_account_id]);
        let args = filters.into_iter().map(CallArg::from);

        self.call_http(endpoint, args)
            .await
            .and_then(list_or_error)
            .context("listing transfers")
    }
}
