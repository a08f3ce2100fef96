pub mod address_allocator;
pub mod cache_janitor;
pub mod price_oracle;
pub mod reconciliation;
pub mod transfer_aggregator;

pub use address_allocator::{AddressAllocator, DonationAddress};
pub use price_oracle::{Market, PriceOracle, QuoteSource};
pub use reconciliation::{CleanupReport, Reconciler};
pub use transfer_aggregator::TransferAggregator;
