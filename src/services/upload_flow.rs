use crate::{
    address::canonical_str,
    config::Config,
    constants::IRYS_DEFAULT_FUND_AMOUNT,
    error::{AppError, Result},
    integrations::irys::{IrysUploader, UploadFile, UploadSdk},
    integrations::wallet::WalletSession,
    services::onchain::LaunchpadViews,
};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundingOutcome {
    /// Storage-network balance already covers the upload.
    AlreadyFunded,
    /// Node was funded from the payer's wallet.
    Funded,
    /// Neither balance covers the cost; the payer must top up.
    Insufficient,
}

/// estimate -> check node balance -> (upload | check payer -> (fund -> upload | insufficient))
pub struct UploadFlow {
    sdk: Arc<dyn UploadSdk>,
    views: Arc<dyn LaunchpadViews>,
    payer_address: Option<String>,
    gateway_url: String,
}

impl UploadFlow {
    pub fn new(
        sdk: Arc<dyn UploadSdk>,
        views: Arc<dyn LaunchpadViews>,
        payer_address: Option<String>,
        gateway_url: String,
    ) -> Self {
        Self {
            sdk,
            views,
            payer_address,
            gateway_url,
        }
    }

    /// Builds the flow over an Irys node picked from the wallet's network, serving
    /// results from the configured gateway.
    pub fn for_wallet<W>(wallet: W, views: Arc<dyn LaunchpadViews>, config: &Config) -> Self
    where
        W: WalletSession + 'static,
    {
        let uploader = IrysUploader::new(wallet);
        let payer_address = uploader.wallet().address();
        Self::new(
            Arc::new(uploader),
            views,
            payer_address,
            config.irys_gateway_url.clone(),
        )
    }

    pub async fn estimate(&self, file_size: u64) -> Result<u128> {
        self.sdk
            .get_price(file_size)
            .await
            .map_err(|e| AppError::ExternalAPI(format!("Price estimate failed: {}", e.detail())))
    }

    pub async fn ensure_funded(&self, file_size: u64) -> Result<FundingOutcome> {
        let cost = self.estimate(file_size).await?;

        let node_balance = self
            .sdk
            .get_balance()
            .await
            .map_err(|e| AppError::ExternalAPI(format!("Balance check failed: {}", e.detail())))?;
        if node_balance > cost {
            return Ok(FundingOutcome::AlreadyFunded);
        }

        let payer = self
            .payer_address
            .as_deref()
            .ok_or(AppError::WalletNotConnected)?;
        let payer_balance = self.views.account_apt_balance(&canonical_str(payer)).await?;

        if payer_balance > cost {
            self.fund_node(Some(cost)).await?;
            return Ok(FundingOutcome::Funded);
        }

        tracing::warn!(
            "Payer balance {} does not cover upload cost {} ({} bytes)",
            payer_balance,
            cost,
            file_size
        );
        Ok(FundingOutcome::Insufficient)
    }

    /// `true` when the upload can proceed (funding the node first if needed).
    pub async fn check_if_fund(&self, file_size: u64) -> Result<bool> {
        let outcome = self.ensure_funded(file_size).await?;
        Ok(outcome != FundingOutcome::Insufficient)
    }

    pub async fn fund_node(&self, amount: Option<u128>) -> Result<()> {
        let amount = amount.unwrap_or(IRYS_DEFAULT_FUND_AMOUNT);
        let receipt = self
            .sdk
            .fund(amount)
            .await
            .map_err(|e| AppError::Funding(e.detail()))?;
        tracing::info!(
            "Successfully funded {} {} (tx {})",
            receipt.quantity,
            self.sdk.token(),
            receipt.id
        );
        Ok(())
    }

    /// Uploads and returns the gateway URL of the stored file.
    pub async fn upload_file(&self, file: &UploadFile) -> Result<String> {
        match self.sdk.upload_file(file, &[]).await {
            Ok(receipt) => Ok(format!(
                "{}/{}",
                self.gateway_url.trim_end_matches('/'),
                receipt.id
            )),
            Err(e) => {
                let detail = e.detail();
                tracing::error!("Irys upload failed: {} ({:?})", detail, e.response);
                Err(AppError::Upload(detail))
            }
        }
    }

    /// Runs the whole flow; `None` means the payer could not cover the cost.
    pub async fn upload_with_funding(&self, file: &UploadFile) -> Result<Option<String>> {
        if !self.check_if_fund(file.size()).await? {
            return Ok(None);
        }
        self.upload_file(file).await.map(Some)
    }
}
