//! Path templates of the platform endpoints.

pub(crate) const TRANSFERS: &str = "/accounts/{accountID}/transfers";
pub(crate) const TRANSFER: &str = "/accounts/{accountID}/transfers/{transferID}";

pub(crate) const RECEIPTS: &str = "/receipts";

pub(crate) const SWEEP_CONFIGS: &str = "/accounts/{accountID}/sweep-configs";
pub(crate) const SWEEP_CONFIG: &str = "/accounts/{accountID}/sweep-configs/{sweepConfigID}";

pub(crate) const SWEEPS: &str = "/accounts/{accountID}/wallets/{walletID}/sweeps";
pub(crate) const SWEEP: &str = "/accounts/{accountID}/wallets/{walletID}/sweeps/{sweepID}";
