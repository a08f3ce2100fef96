pub use self::{
    market::{ExchangeTicker, MarketQuote},
    rpc::{RpcErrorBody, RpcRequest, RpcResponse},
    wallet::{
        CreatedAccount, CreatedAddress, GetAccounts, GetAddress, GetPayments,
        GetTransfers, IntegratedAddress, PaymentEntry, SubaddressAccount,
        SubaddressEntry, TransferEntry,
    },
};

mod market;
mod rpc;
mod wallet;
