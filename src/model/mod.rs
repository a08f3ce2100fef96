//! Domain models
//!
//! `models.rs` holds the persisted proposal records, `funding.rs` the
//! reconciliation output and `price_quote.rs` the cached market pair.

mod funding;
mod models;
mod price_quote;
mod table;

pub use funding::{Funding, Transfer, TransferSet, WalletAccount};
pub use models::{NewProposal, Proposal, ProposalStatus};
pub use price_quote::PriceQuote;
pub use table::Table;
