use std::slice;

use chrono::{DateTime, Utc};
use http::Method;
use serde::{Deserialize, Serialize};

use super::paths;
use crate::client::{
    CallArg, Endpoint, MoovClient, MoovError, ResultExt, json_body, list_or_error, query,
};

/// Request body of [`MoovClient::create_receipt`].
///
/// A receipt is sent for exactly one of a transfer, a schedule or a schedule occurrence,
/// to either an email address or the email of an account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReceipt {
    /// Receipt template, e.g. `sale.customer.v1`.
    pub kind: String,
    /// Recipient address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Account whose email receives the receipt.
    #[serde(rename = "emailAccountID", default, skip_serializing_if = "Option::is_none")]
    pub email_account_id: Option<String>,
    /// Transfer the receipt is for.
    #[serde(rename = "forTransferID", default, skip_serializing_if = "Option::is_none")]
    pub for_transfer_id: Option<String>,
    /// Schedule the receipt is for.
    #[serde(rename = "forScheduleID", default, skip_serializing_if = "Option::is_none")]
    pub for_schedule_id: Option<String>,
    /// Schedule occurrence the receipt is for.
    #[serde(rename = "forOccurrenceID", default, skip_serializing_if = "Option::is_none")]
    pub for_occurrence_id: Option<String>,
}

impl CreateReceipt {
    /// Creates a receipt request of the given kind for a transfer.
    pub fn for_transfer(kind: impl Into<String>, transfer_id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            for_transfer_id: Some(transfer_id.into()),
            ..Self::default()
        }
    }

    /// Sends the receipt to this address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// A receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Receipt identifier.
    #[serde(rename = "receiptID")]
    pub receipt_id: String,
    /// Receipt template.
    pub kind: String,
    /// Account that created the receipt.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub created_by: String,
    /// Recipient address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Account whose email receives the receipt.
    #[serde(rename = "emailAccountID", default, skip_serializing_if = "Option::is_none")]
    pub email_account_id: Option<String>,
    /// Transfer the receipt is for.
    #[serde(rename = "forTransferID", default, skip_serializing_if = "Option::is_none")]
    pub for_transfer_id: Option<String>,
    /// Schedule the receipt is for.
    #[serde(rename = "forScheduleID", default, skip_serializing_if = "Option::is_none")]
    pub for_schedule_id: Option<String>,
    /// Schedule occurrence the receipt is for.
    #[serde(rename = "forOccurrenceID", default, skip_serializing_if = "Option::is_none")]
    pub for_occurrence_id: Option<String>,
    /// Disabling time, for disabled receipts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_on: Option<DateTime<Utc>>,
    /// Deliveries so far; grows while the platform sends the receipt.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sent_for: Vec<ReceiptSent>,
}

/// One delivery of a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptSent {
    /// Receipt identifier.
    #[serde(rename = "receiptID")]
    pub receipt_id: String,
    /// Key of the delivery.
    pub idempotency_key: String,
    /// Delivery time.
    pub sent_on: DateTime<Utc>,
}

/// Filter accepted by [`MoovClient::list_receipts`].
#[derive(Debug, Clone)]
pub struct ListReceiptsFilter(CallArg);

impl ListReceiptsFilter {
    /// Only receipts for this transfer.
    pub fn by_transfer_id(transfer_id: impl Into<String>) -> Self {
        let transfer_id: String = transfer_id.into();
        Self(query("id", transfer_id))
    }
}

impl From<ListReceiptsFilter> for CallArg {
    fn from(value: ListReceiptsFilter) -> Self {
        value.0
    }
}

impl MoovClient {
    /// Creates a receipt.
    ///
    /// The platform answers with every receipt created by the request, here a single one.
    ///
    /// # Errors
    ///
    /// Fails with the call or resolution error, in the `creating receipt` context.
    pub async fn create_receipt(&self, create: &CreateReceipt) -> Result<Vec<Receipt>, MoovError> {
        let endpoint = Endpoint::new(Method::POST, paths::RECEIPTS, Vec::<String>::new());

        self.call_http(endpoint, [json_body(slice::from_ref(create))])
            .await
            .and_then(list_or_error)
            .context("creating receipt")
    }

    /// Lists receipts.
    ///
    /// # Errors
    ///
    /// Fails with the call or resolution error, in the `listing receipts` context.
    pub async fn list_receipts<I>(&self, filters: I) -> Result<Vec<Receipt>, MoovError>
    where
        I: IntoIterator<Item = ListReceiptsFilter>,
    {
        let endpoint = Endpoint::new(Method::GET, paths::RECEIPTS, Vec::<String>::new());

        self.call_http(endpoint, filters.into_iter().map(CallArg::from))
            .await
            .and_then(list_or_error)
            .context("listing receipts")
    }
}
