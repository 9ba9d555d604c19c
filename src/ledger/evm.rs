// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! EVM ledger submitter (Ethereum Holesky).
//!
//! Native transfers only: EIP-1559 fee derivation, fixed 21 000 gas limit,
//! receipt polling for confirmation.

use std::str::FromStr;

use alloy::{
    network::EthereumWallet,
    primitives::{Address, U256},
    providers::{Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use async_trait::async_trait;

use super::{LedgerConfirmation, LedgerError, LedgerSubmitter, SubmissionHandle};

/// Standard gas limit for a native transfer.
const NATIVE_TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Ledger network configuration.
#[derive(Debug, Clone)]
pub struct LedgerNetwork {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// Default RPC endpoint URL
    pub rpc_url: &'static str,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

/// Ethereum Holesky testnet configuration.
pub const HOLESKY: LedgerNetwork = LedgerNetwork {
    name: "Ethereum Holesky Testnet",
    chain_id: 17000,
    rpc_url: "https://ethereum-holesky.publicnode.com",
    explorer_url: "https://holesky.etherscan.io",
};

/// Signing HTTP provider type (with all fillers and the wallet filler).
type SigningProvider = alloy::providers::fillers::FillProvider<
    alloy::providers::fillers::JoinFill<
        alloy::providers::fillers::JoinFill<
            alloy::providers::Identity,
            alloy::providers::fillers::JoinFill<
                alloy::providers::fillers::GasFiller,
                alloy::providers::fillers::JoinFill<
                    alloy::providers::fillers::BlobGasFiller,
                    alloy::providers::fillers::JoinFill<
                        alloy::providers::fillers::NonceFiller,
                        alloy::providers::fillers::ChainIdFiller,
                    >,
                >,
            >,
        >,
        alloy::providers::fillers::WalletFiller<EthereumWallet>,
    >,
    alloy::providers::RootProvider<alloy::network::Ethereum>,
>;

/// Ledger submitter for an EVM chain, signing with a locally injected key.
#[derive(Debug)]
pub struct EvmSubmitter {
    network: LedgerNetwork,
    provider: SigningProvider,
}

impl EvmSubmitter {
    /// Create a submitter for the given network and RPC endpoint, signing
    /// with the hex-encoded private key (64 characters, no 0x prefix).
    pub fn new(
        network: LedgerNetwork,
        rpc_url: &str,
        signing_key_hex: &str,
    ) -> Result<Self, LedgerError> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e: url::ParseError| LedgerError::Unavailable(format!("invalid RPC URL: {e}")))?;

        let key_bytes = alloy::hex::decode(signing_key_hex.trim_start_matches("0x"))
            .map_err(|e| LedgerError::Unavailable(format!("invalid signing key: {e}")))?;
        let signer = PrivateKeySigner::from_slice(&key_bytes)
            .map_err(|e| LedgerError::Unavailable(format!("invalid signing key: {e}")))?;
        let wallet = EthereumWallet::from(signer);

        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        Ok(Self { network, provider })
    }

    /// Current EIP-1559 fee pair: (max fee, priority fee).
    async fn get_gas_prices(&self) -> Result<(u128, u128), LedgerError> {
        let block = self
            .provider
            .get_block_by_number(alloy::eips::BlockNumberOrTag::Latest)
            .await
            .map_err(|e| LedgerError::Unavailable(format!("failed to get block: {e}")))?
            .ok_or_else(|| LedgerError::Unavailable("no latest block".to_string()))?;

        let base_fee: u128 = block
            .header
            .base_fee_per_gas
            .map(|f| f as u128)
            .unwrap_or(25_000_000_000u128); // 25 gwei default

        let priority_fee: u128 = 1_500_000_000; // 1.5 gwei

        // Max fee = 2 * base_fee + priority_fee (allows for base fee increase)
        let max_fee = base_fee.saturating_mul(2).saturating_add(priority_fee);

        Ok((max_fee, priority_fee))
    }
}

#[async_trait]
impl LedgerSubmitter for EvmSubmitter {
    async fn submit(
        &self,
        destination: &str,
        amount_wei: u128,
    ) -> Result<SubmissionHandle, LedgerError> {
        let to_addr = Address::from_str(destination)
            .map_err(|e| LedgerError::InvalidDestination(e.to_string()))?;

        let (max_fee_per_gas, priority_fee) = self.get_gas_prices().await?;

        let tx = TransactionRequest::default()
            .to(to_addr)
            .value(U256::from(amount_wei))
            .gas_limit(NATIVE_TRANSFER_GAS_LIMIT)
            .max_fee_per_gas(max_fee_per_gas)
            .max_priority_fee_per_gas(priority_fee);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| LedgerError::Rejected(e.to_string()))?;

        let tx_hash = format!("{:?}", pending.tx_hash());
        let explorer_url = format!("{}/tx/{}", self.network.explorer_url, tx_hash);

        Ok(SubmissionHandle {
            tx_hash,
            explorer_url,
        })
    }

    async fn confirmation(
        &self,
        handle: &SubmissionHandle,
    ) -> Result<Option<LedgerConfirmation>, LedgerError> {
        let hash = handle
            .tx_hash
            .parse()
            .map_err(|e| LedgerError::Unavailable(format!("invalid tx hash: {e}")))?;

        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| LedgerError::Unavailable(format!("failed to get receipt: {e}")))?;

        Ok(receipt.map(|r| LedgerConfirmation {
            block_number: r.block_number.unwrap_or(0),
            success: r.status(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holesky_constants() {
        assert_eq!(HOLESKY.chain_id, 17000);
        assert!(HOLESKY.rpc_url.starts_with("https://"));
        assert!(HOLESKY.explorer_url.starts_with("https://"));
    }

    #[test]
    fn submitter_rejects_malformed_signing_key() {
        let err = EvmSubmitter::new(HOLESKY, HOLESKY.rpc_url, "not-hex").unwrap_err();
        assert!(matches!(err, LedgerError::Unavailable(_)));

        // Wrong length (valid hex, not a key).
        let err = EvmSubmitter::new(HOLESKY, HOLESKY.rpc_url, "abcd").unwrap_err();
        assert!(matches!(err, LedgerError::Unavailable(_)));
    }

    #[test]
    fn submitter_accepts_0x_prefixed_key() {
        let key = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
        assert!(EvmSubmitter::new(HOLESKY, HOLESKY.rpc_url, key).is_ok());
    }
}
