pub use self::types::{PoolOption, PoolType};

mod proposal;
mod types;
