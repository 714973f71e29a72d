pub mod executable;
pub mod transaction;
pub mod utils;

pub use transaction::{InstalledBinary, Installation, install_binary};
