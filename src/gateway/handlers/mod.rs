pub mod health;
pub mod transfer;
pub mod wallet;

pub use health::health_check;
pub use transfer::{create_transfer, get_transfer};
pub use wallet::{CreateWalletRequest, create_wallet, get_balance, get_transactions};
