pub mod irys;
pub mod wallet;

pub use irys::{IrysNode, IrysUploader, UploadFile, UploadSdk, UploadSdkError};
pub use wallet::{AdaptedWallet, WalletSession};
