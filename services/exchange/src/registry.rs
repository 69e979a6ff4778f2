//! Pool Registry
//!
//! Maps each token address to its single [`PoolEngine`]. Entries are created
//! once and never replaced or removed; a second creation attempt for the same
//! token fails with [`ExchangeError::PoolAlreadyExists`].

use crate::engine::PoolEngine;
use crate::error::{ExchangeError, Result};
use crate::token::TokenLedger;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use exchange_config::defaults::DEFAULT_DECIMALS;
use exchange_config::ExchangeConfig;
use std::sync::Arc;
use tracing::info;
use types::{Address, TokenAmount};

pub struct PoolRegistry {
    /// Shared base asset every pool trades against
    base_asset: Arc<dyn TokenLedger>,

    /// All pools indexed by token address
    pools: DashMap<Address, Arc<PoolEngine>>,

    /// Decimal scale of amounts at the caller surface
    decimals: u8,
}

impl PoolRegistry {
    pub fn new(base_asset: Arc<dyn TokenLedger>) -> Self {
        Self {
            base_asset,
            pools: DashMap::new(),
            decimals: DEFAULT_DECIMALS,
        }
    }

    /// Use `decimals` when converting between text and integer units
    pub fn with_decimals(mut self, decimals: u8) -> Self {
        self.decimals = decimals;
        self
    }

    /// Build a registry and create one pool per configured token
    ///
    /// `resolve_token` supplies the ledger for each configured token address.
    pub fn from_config<F>(
        config: &ExchangeConfig,
        base_asset: Arc<dyn TokenLedger>,
        mut resolve_token: F,
    ) -> Result<Self>
    where
        F: FnMut(&Address, &str) -> Arc<dyn TokenLedger>,
    {
        let registry = Self::new(base_asset).with_decimals(config.exchange.decimals);
        for spec in &config.pools {
            let ledger = resolve_token(&spec.token, &spec.symbol);
            registry.create_pool(spec.token, ledger)?;
        }

        info!(
            "PoolRegistry initialized: {} pools against {} at {} decimals",
            registry.len(),
            config.exchange.base_symbol,
            registry.decimals
        );
        Ok(registry)
    }

    /// Create the pool for `token`; fails if one already exists
    pub fn create_pool(
        &self,
        token: Address,
        token_asset: Arc<dyn TokenLedger>,
    ) -> Result<Arc<PoolEngine>> {
        if token.is_zero() {
            return Err(ExchangeError::InvalidRoute {
                reason: "zero address cannot back a pool",
            });
        }

        match self.pools.entry(token) {
            Entry::Occupied(_) => Err(ExchangeError::PoolAlreadyExists(token)),
            Entry::Vacant(slot) => {
                let pool = Arc::new(PoolEngine::new(
                    token,
                    self.base_asset.clone(),
                    token_asset,
                ));
                slot.insert(pool.clone());
                info!(
                    "Created pool for {} ({}) at {}",
                    pool.symbol(),
                    token,
                    pool.pool_address()
                );
                Ok(pool)
            }
        }
    }

    /// Register an already-built pool, e.g. one restored from a record
    pub fn insert_pool(&self, pool: Arc<PoolEngine>) -> Result<Arc<PoolEngine>> {
        let token = pool.token();
        match self.pools.entry(token) {
            Entry::Occupied(_) => Err(ExchangeError::PoolAlreadyExists(token)),
            Entry::Vacant(slot) => {
                slot.insert(pool.clone());
                Ok(pool)
            }
        }
    }

    pub fn lookup(&self, token: &Address) -> Result<Arc<PoolEngine>> {
        self.pools
            .get(token)
            .map(|entry| entry.value().clone())
            .ok_or(ExchangeError::PoolNotFound(*token))
    }

    pub fn contains(&self, token: &Address) -> bool {
        self.pools.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Registered token addresses, sorted
    pub fn tokens(&self) -> Vec<Address> {
        let mut tokens: Vec<Address> = self.pools.iter().map(|entry| *entry.key()).collect();
        tokens.sort();
        tokens
    }

    pub fn base_asset(&self) -> &Arc<dyn TokenLedger> {
        &self.base_asset
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    /// Integer units for a decimal string such as `"0.005"`
    pub fn parse_amount(&self, input: &str) -> Result<u128> {
        Ok(TokenAmount::parse(input, self.decimals)?.units())
    }

    /// Decimal string for integer units, e.g. a receipt amount
    pub fn format_amount(&self, units: u128) -> String {
        TokenAmount::from_units(units, self.decimals).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::InMemoryToken;
    use exchange_config::PoolSpec;

    fn base() -> Arc<dyn TokenLedger> {
        Arc::new(InMemoryToken::new("ETH"))
    }

    #[test]
    fn test_create_and_lookup() {
        let registry = PoolRegistry::new(base());
        let token = Address::repeat_byte(1);
        let pool = registry
            .create_pool(token, Arc::new(InMemoryToken::new("USDC")))
            .unwrap();

        let found = registry.lookup(&token).unwrap();
        assert!(Arc::ptr_eq(&pool, &found));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(&token));
    }

    #[test]
    fn test_duplicate_creation_fails_and_keeps_original() {
        let registry = PoolRegistry::new(base());
        let token = Address::repeat_byte(1);
        let original = registry
            .create_pool(token, Arc::new(InMemoryToken::new("USDC")))
            .unwrap();

        let err = registry
            .create_pool(token, Arc::new(InMemoryToken::new("FAKE")))
            .unwrap_err();
        assert_eq!(err, ExchangeError::PoolAlreadyExists(token));
        assert!(Arc::ptr_eq(&original, &registry.lookup(&token).unwrap()));
        assert_eq!(registry.lookup(&token).unwrap().symbol(), "USDC");
    }

    #[test]
    fn test_lookup_missing() {
        let registry = PoolRegistry::new(base());
        let token = Address::repeat_byte(9);
        assert_eq!(
            registry.lookup(&token).unwrap_err(),
            ExchangeError::PoolNotFound(token)
        );
    }

    #[test]
    fn test_from_config() {
        let mut config = ExchangeConfig::default();
        config.pools = vec![
            PoolSpec {
                token: Address::repeat_byte(2),
                symbol: "DAI".into(),
            },
            PoolSpec {
                token: Address::repeat_byte(1),
                symbol: "USDC".into(),
            },
        ];

        let registry = PoolRegistry::from_config(&config, base(), |_, symbol| {
            Arc::new(InMemoryToken::new(symbol)) as Arc<dyn TokenLedger>
        })
        .unwrap();

        assert_eq!(
            registry.tokens(),
            vec![Address::repeat_byte(1), Address::repeat_byte(2)]
        );
        assert_eq!(registry.lookup(&Address::repeat_byte(2)).unwrap().symbol(), "DAI");
        assert_eq!(registry.decimals(), 18);
    }

    #[test]
    fn test_amount_text_uses_configured_scale() {
        let registry = PoolRegistry::new(base()).with_decimals(6);

        assert_eq!(registry.parse_amount("1.25").unwrap(), 1_250_000);
        assert_eq!(registry.format_amount(1_250_000), "1.25");
        assert!(matches!(
            registry.parse_amount("0.0000001"),
            Err(ExchangeError::AmountText(_))
        ));
    }
}
