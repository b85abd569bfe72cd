//! Remote locker services: submit a locator, let the service fetch the
//! content, then pull it down over plain HTTP.

mod premiumize;
mod types;

pub use premiumize::PremiumizeClient;
pub use types::{Locker, LockerError, Transfer, TransferStatus};
