//! Withdrawals whose token payout is rejected by the token ledger

mod common;

use common::*;
use exchange::{
    AddLiquidity, Address, ExchangeError, InMemoryToken, PoolEngine, PoolEvent, RemoveLiquidity,
    TokenLedger,
};
use std::sync::Arc;

const LP: Address = Address::repeat_byte(0x33);

struct FlakyPool {
    base: Arc<InMemoryToken>,
    token: Arc<FlakyToken>,
    pool: PoolEngine,
}

/// LP holds 10000/20000; PROVIDER then deposits 1000/2000 with the given
/// base allowance, leaving `provider_base_allowance - 1000` unspent
fn flaky_pool(provider_base_allowance: u128) -> FlakyPool {
    let base = Arc::new(InMemoryToken::new("ETH"));
    let token = Arc::new(FlakyToken::new("USDC"));
    let pool = PoolEngine::new(USDC, base.clone(), token.clone());

    for who in [LP, PROVIDER] {
        base.mint(&who, STARTING_BALANCE).unwrap();
        token.inner().mint(&who, STARTING_BALANCE).unwrap();
    }
    base.approve(&LP, &pool.pool_address(), u128::MAX);
    token.inner().approve(&LP, &pool.pool_address(), u128::MAX);
    base.approve(&PROVIDER, &pool.pool_address(), provider_base_allowance);
    token.inner().approve(&PROVIDER, &pool.pool_address(), 2000);

    for (who, base_in, token_in) in [(LP, 10_000, 20_000), (PROVIDER, 1000, 2000)] {
        pool.add_liquidity(
            &AddLiquidity {
                provider: who,
                base_in,
                token_in_desired: token_in,
                token_in_min: 0,
                deadline: DEADLINE,
            },
            NOW,
        )
        .unwrap();
    }
    pool.drain_events();

    FlakyPool { base, token, pool }
}

fn withdraw_all(pool: &PoolEngine) -> Result<exchange::LiquidityReceipt, ExchangeError> {
    pool.remove_liquidity(
        &RemoveLiquidity {
            provider: PROVIDER,
            shares: 1000,
            base_out_min: 0,
            token_out_min: 0,
            deadline: DEADLINE,
        },
        NOW,
    )
}

fn assert_holdings_match(f: &FlakyPool) {
    let snapshot = f.pool.snapshot();
    assert_eq!(f.base.balance_of(&f.pool.pool_address()), snapshot.base_reserve);
    assert_eq!(
        f.token.balance_of(&f.pool.pool_address()),
        snapshot.token_reserve + f.pool.total_owed()
    );
}

#[test]
fn test_reclaimed_base_leaves_withdrawal_uncommitted() {
    let f = flaky_pool(u128::MAX);
    let before = f.pool.snapshot();
    f.token.reject_payouts(true);

    let err = withdraw_all(&f.pool).unwrap_err();

    assert!(matches!(err, ExchangeError::TransferRejected(_)));
    assert_eq!(f.pool.snapshot(), before);
    assert_eq!(f.pool.shares_of(&PROVIDER), 1000);
    assert_eq!(f.pool.owed_to(&PROVIDER), 0);
    assert_eq!(f.base.balance_of(&PROVIDER), STARTING_BALANCE - 1000);
    assert_holdings_match(&f);
    assert!(f.pool.drain_events().is_empty());
}

#[test]
fn test_unreclaimable_base_commits_withdrawal_and_owes_tokens() {
    // Exact approval: nothing left for the pool to pull back
    let f = flaky_pool(1000);
    f.token.reject_payouts(true);

    let err = withdraw_all(&f.pool).unwrap_err();
    assert!(matches!(err, ExchangeError::PayoutDeferred { owed: 2000, .. }));

    let snapshot = f.pool.snapshot();
    assert_eq!((snapshot.base_reserve, snapshot.token_reserve), (10_000, 20_000));
    assert_eq!(snapshot.total_shares, 10_000);
    assert_eq!(f.pool.shares_of(&PROVIDER), 0);
    assert_eq!(f.pool.owed_to(&PROVIDER), 2000);
    assert_eq!(f.base.balance_of(&PROVIDER), STARTING_BALANCE);
    assert_holdings_match(&f);

    // Repeating the call cannot pay base out again
    let err = withdraw_all(&f.pool).unwrap_err();
    assert_eq!(
        err,
        ExchangeError::InsufficientShares {
            requested: 1000,
            available: 0
        }
    );
    assert_eq!(f.base.balance_of(&PROVIDER), STARTING_BALANCE);
    assert_holdings_match(&f);

    let events = f.pool.drain_events();
    assert!(matches!(
        events.as_slice(),
        [
            PoolEvent::LiquidityRemoved {
                shares_burned: 1000,
                ..
            },
            PoolEvent::PayoutDeferred {
                token_amount: 2000,
                ..
            }
        ]
    ));
}

#[test]
fn test_owed_tokens_are_claimable_once_payouts_resume() {
    let f = flaky_pool(1000);
    f.token.reject_payouts(true);
    withdraw_all(&f.pool).unwrap_err();

    let err = f.pool.claim_owed(&PROVIDER, NOW).unwrap_err();
    assert!(matches!(err, ExchangeError::TransferRejected(_)));
    assert_eq!(f.pool.owed_to(&PROVIDER), 2000);

    // Owed balance survives persistence
    let record = f.pool.record();
    assert_eq!(record.owed.get(&PROVIDER), Some(&2000));

    f.token.reject_payouts(false);
    assert_eq!(f.pool.claim_owed(&PROVIDER, NOW).unwrap(), 2000);
    assert_eq!(f.token.balance_of(&PROVIDER), STARTING_BALANCE);
    assert_eq!(f.pool.total_owed(), 0);
    assert_holdings_match(&f);

    assert!(matches!(
        f.pool.claim_owed(&PROVIDER, NOW),
        Err(ExchangeError::InvalidAmount { .. })
    ));
    assert!(matches!(
        f.pool.drain_events().last(),
        Some(PoolEvent::OwedClaimed {
            token_amount: 2000,
            ..
        })
    ));
}

#[test]
fn test_rejected_base_payout_moves_nothing() {
    let base = Arc::new(FlakyToken::new("ETH"));
    let token = Arc::new(InMemoryToken::new("USDC"));
    let pool = PoolEngine::new(USDC, base.clone(), token.clone());
    base.inner().mint(&PROVIDER, STARTING_BALANCE).unwrap();
    token.mint(&PROVIDER, STARTING_BALANCE).unwrap();
    base.inner().approve(&PROVIDER, &pool.pool_address(), 1000);
    token.approve(&PROVIDER, &pool.pool_address(), 2000);
    pool.add_liquidity(
        &AddLiquidity {
            provider: PROVIDER,
            base_in: 1000,
            token_in_desired: 2000,
            token_in_min: 0,
            deadline: DEADLINE,
        },
        NOW,
    )
    .unwrap();
    let before = pool.snapshot();

    base.reject_payouts(true);
    let err = withdraw_all(&pool).unwrap_err();

    assert!(matches!(err, ExchangeError::TransferRejected(_)));
    assert_eq!(pool.snapshot(), before);
    assert_eq!(pool.owed_to(&PROVIDER), 0);
    assert_eq!(token.balance_of(&PROVIDER), STARTING_BALANCE - 2000);
}
