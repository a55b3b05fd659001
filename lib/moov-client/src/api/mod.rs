//! Typed wrappers around the platform endpoints, with their JSON models.

mod paths;

mod common;
pub use self::common::{Amount, AmountDecimal};

mod transfers;
pub use self::transfers::{
    CreateTransfer, CreateTransferDestination, CreateTransferOption, CreateTransferSource,
    FacilitatorFee, ListTransfersFilter, Transfer, TransferAccount, TransferEndpoint,
    TransferStarted, TransferStatus,
};

mod receipts;
pub use self::receipts::{CreateReceipt, ListReceiptsFilter, Receipt, ReceiptSent};

mod sweeps;
pub use self::sweeps::{
    CreateSweepConfig, ListSweepsFilter, Sweep, SweepConfig, SweepConfigStatus, SweepStatus,
    UpdateSweepConfig,
};
