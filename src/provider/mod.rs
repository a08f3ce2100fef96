pub use self::{
    daemon::Daemon,
    database::DatabasePool,
    http::HTTP,
    wallet::{RpcTransport, WalletClient},
};

mod daemon;
mod database;
mod http;
mod wallet;
