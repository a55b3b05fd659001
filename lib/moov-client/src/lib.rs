//! # Moov client
//!
//! Typed async client for the Moov payments API.
//!
//! Every endpoint wrapper follows the same path: a set of [`CallArg`] options
//! describes the request, an [`Endpoint`] resolves the path,
//! [`MoovClient::call_http`] performs exactly one HTTP exchange, and a resolver turns
//! the [`RawResponse`] into a typed value or a [`MoovError`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use moov_client::{
//!     Amount, CreateReceipt, CreateTransfer, CreateTransferOption, ListReceiptsFilter,
//!     MoovClient, Outcome,
//! };
//!
//! # async fn example() -> Result<(), moov_client::MoovError> {
//! let client = MoovClient::from_env()?;
//!
//! let create = CreateTransfer::new("card-payment-method", "wallet-payment-method", Amount::new("usd", 1));
//! let outcome = client
//!     .create_transfer("partner-account", &create, [CreateTransferOption::wait_for_rail_response()])
//!     .await?;
//!
//! let transfer_id = match &outcome {
//!     Outcome::Completed(transfer) => transfer.transfer_id.clone(),
//!     Outcome::Started(started) => started.transfer_id.clone(),
//! };
//!
//! let receipts = client
//!     .create_receipt(&CreateReceipt::for_transfer("sale.customer.v1", &transfer_id).with_email("noreply@moov.io"))
//!     .await?;
//! let listed = client
//!     .list_receipts([ListReceiptsFilter::by_transfer_id(&transfer_id)])
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Calls fail with one [`MoovError`]. Wrappers add the operation they were
//! performing, and [`MoovError::root_cause`] gives back the underlying
//! transport, HTTP, API, decoding or path error.
//!
//! ## Cancellation and deadlines
//!
//! Dropping a call's future cancels it. Deadlines are set client-wide with
//! [`MoovClientBuilder::with_timeout`] or per call with [`timeout`]; an expired
//! deadline is a [`MoovError::Transport`].
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events: requests and responses at `debug`, applied
//! options at `trace`, undecodable error bodies at `warn`. Install a subscriber to
//! see them.

mod api;
pub use self::api::*;

mod client;
pub use self::client::*;
