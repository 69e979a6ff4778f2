//! Shared fixtures for exchange integration tests

#![allow(dead_code)]

use exchange::{
    Address, AddLiquidity, InMemoryToken, PoolEngine, PoolRegistry, TokenLedger, TransferError,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const PROVIDER: Address = Address::repeat_byte(0x11);
pub const TRADER: Address = Address::repeat_byte(0x22);
pub const USDC: Address = Address::repeat_byte(0xa0);
pub const DAI: Address = Address::repeat_byte(0xb0);

pub const NOW: u64 = 1_700_000_000;
pub const DEADLINE: u64 = NOW + 1_000;

pub const STARTING_BALANCE: u128 = 1_000_000_000;

/// Registry with USDC and DAI pools, funded and approved accounts
pub struct Market {
    pub base: Arc<InMemoryToken>,
    pub usdc: Arc<InMemoryToken>,
    pub dai: Arc<InMemoryToken>,
    pub registry: Arc<PoolRegistry>,
}

impl Market {
    pub fn new() -> Self {
        let base = Arc::new(InMemoryToken::new("ETH"));
        let usdc = Arc::new(InMemoryToken::new("USDC"));
        let dai = Arc::new(InMemoryToken::new("DAI"));
        let registry = Arc::new(PoolRegistry::new(base.clone()));

        let usdc_pool = registry.create_pool(USDC, usdc.clone()).unwrap();
        let dai_pool = registry.create_pool(DAI, dai.clone()).unwrap();

        for who in [PROVIDER, TRADER] {
            fund(&base, &who, &[&usdc_pool, &dai_pool]);
            fund(&usdc, &who, &[&usdc_pool]);
            fund(&dai, &who, &[&dai_pool]);
        }

        Self {
            base,
            usdc,
            dai,
            registry,
        }
    }

    pub fn pool(&self, token: Address) -> Arc<PoolEngine> {
        self.registry.lookup(&token).unwrap()
    }

    pub fn seed(&self, token: Address, base_in: u128, token_in: u128) {
        self.pool(token)
            .add_liquidity(
                &AddLiquidity {
                    provider: PROVIDER,
                    base_in,
                    token_in_desired: token_in,
                    token_in_min: 0,
                    deadline: DEADLINE,
                },
                NOW,
            )
            .unwrap();
    }
}

pub fn fund(token: &InMemoryToken, who: &Address, pools: &[&Arc<PoolEngine>]) {
    token.mint(who, STARTING_BALANCE).unwrap();
    for pool in pools {
        token.approve(who, &pool.pool_address(), u128::MAX);
    }
}

/// Token ledger wrapper whose transfers can be switched off
pub struct FlakyToken {
    inner: InMemoryToken,
    reject_pulls: AtomicBool,
    reject_payouts: AtomicBool,
}

impl FlakyToken {
    pub fn new(symbol: &str) -> Self {
        Self {
            inner: InMemoryToken::new(symbol),
            reject_pulls: AtomicBool::new(false),
            reject_payouts: AtomicBool::new(false),
        }
    }

    pub fn inner(&self) -> &InMemoryToken {
        &self.inner
    }

    pub fn reject_pulls(&self, reject: bool) {
        self.reject_pulls.store(reject, Ordering::SeqCst);
    }

    pub fn reject_payouts(&self, reject: bool) {
        self.reject_payouts.store(reject, Ordering::SeqCst);
    }
}

impl TokenLedger for FlakyToken {
    fn symbol(&self) -> &str {
        self.inner.symbol()
    }

    fn balance_of(&self, owner: &Address) -> u128 {
        self.inner.balance_of(owner)
    }

    fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), TransferError> {
        if self.reject_pulls.load(Ordering::SeqCst) {
            return Err(TransferError::Rejected {
                reason: "token paused".into(),
            });
        }
        self.inner.transfer_from(spender, from, to, amount)
    }

    fn transfer(&self, from: &Address, to: &Address, amount: u128) -> Result<(), TransferError> {
        if self.reject_payouts.load(Ordering::SeqCst) {
            return Err(TransferError::Rejected {
                reason: "token paused".into(),
            });
        }
        self.inner.transfer(from, to, amount)
    }
}
