pub mod materials;
pub mod poller;
pub mod session;
pub mod transfer;

pub use crate::domain::model::{DataTransfer, Passport};
pub use crate::domain::ports::{ConfigProvider, PassportApi, Storage, TransferApi};
pub use crate::utils::error::Result;
