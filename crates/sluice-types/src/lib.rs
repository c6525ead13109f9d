pub mod address;
pub mod amount;
pub mod error;

pub use address::AccountAddress;
pub use amount::{TokenAmount, MAX_TOKEN_DECIMALS};
pub use error::{DistributionError, Result};
