//! Reward Token Smoke Test
//!
//! Validates the reward token's policy end to end:
//! - Only the minter mints, and never past the 500k hard cap
//! - Every transfer pays 0.1% to the fee account and burns 0.9%
//! - A whitelisted sender or receiver pays nothing
//! - Failed transfers leave balances untouched
//!
//! Run with: cargo test -p brew-treasury --test token_fee_smoke -- --nocapture

use brew_treasury::{AssetLedger, InMemoryAssetLedger, LedgerError, TokenPolicy, TransferFee};
use brew_types::{tokens, AccountId, Amount, AssetId, ONE_TOKEN};

// =============================================================================
// TEST HELPERS
// =============================================================================

fn reward() -> AssetId {
    AssetId::from("BREW")
}

fn acct(name: &str) -> AccountId {
    AccountId::from(name)
}

/// Reward token minted and administered by alice; fees go to `fee`.
fn reward_ledger() -> InMemoryAssetLedger {
    let policy = TokenPolicy::new(acct("alice"))
        .with_hard_cap(tokens(500_000))
        .with_transfer_fee(TransferFee::reward_token_default(acct("fee")));
    let mut ledger = InMemoryAssetLedger::new();
    ledger.create_asset(reward(), policy).unwrap();
    ledger
}

fn balance(ledger: &InMemoryAssetLedger, who: &str) -> Amount {
    ledger.balance_of(&reward(), &acct(who)).unwrap()
}

/// Amount given in thousandths of a token.
fn milli(thousandths: u128) -> Amount {
    thousandths * ONE_TOKEN / 1_000
}

// =============================================================================
// TEST 1: MINT AUTHORITY
// =============================================================================

#[test]
fn test_only_minter_can_mint() {
    println!("\n=== TEST 1: Mint Authority ===");
    let mut ledger = reward_ledger();

    ledger.mint(&reward(), &acct("alice"), &acct("alice"), tokens(100)).unwrap();
    ledger.mint(&reward(), &acct("alice"), &acct("bob"), tokens(1_000)).unwrap();
    let denied = ledger.mint(&reward(), &acct("bob"), &acct("carol"), tokens(1_000));
    println!("  bob minting: {:?}", denied);
    assert!(matches!(denied, Err(LedgerError::Unauthorized { .. })));

    assert_eq!(ledger.total_supply(&reward()).unwrap(), tokens(1_100));
    assert_eq!(balance(&ledger, "alice"), tokens(100));
    assert_eq!(balance(&ledger, "bob"), tokens(1_000));
    assert_eq!(balance(&ledger, "carol"), 0);

    // Handing minting rights over locks the previous minter out.
    ledger.set_minter(&reward(), &acct("alice"), acct("farm")).unwrap();
    assert!(ledger.mint(&reward(), &acct("alice"), &acct("alice"), 1).is_err());
    ledger.mint(&reward(), &acct("farm"), &acct("alice"), 1).unwrap();
    println!("✓ Minting restricted to the current minter");
}

// =============================================================================
// TEST 2: FEE ON TRANSFER
// =============================================================================

#[test]
fn test_transfer_fee_and_burn() {
    println!("\n=== TEST 2: Fee On Transfer ===");
    let mut ledger = reward_ledger();
    ledger.mint(&reward(), &acct("alice"), &acct("alice"), tokens(100)).unwrap();
    ledger.mint(&reward(), &acct("alice"), &acct("bob"), tokens(200)).unwrap();

    let first = ledger
        .transfer(&reward(), &acct("alice"), &acct("carol"), tokens(10))
        .unwrap();
    let second = ledger
        .transfer(&reward(), &acct("bob"), &acct("carol"), tokens(100))
        .unwrap();
    println!("  carol received {} + {}", first, second);

    assert_eq!(first, milli(9_900));
    assert_eq!(second, tokens(99));
    assert_eq!(balance(&ledger, "alice"), tokens(90));
    assert_eq!(balance(&ledger, "bob"), tokens(100));
    assert_eq!(balance(&ledger, "carol"), milli(108_900));
    assert_eq!(balance(&ledger, "fee"), milli(110));
    assert_eq!(ledger.total_supply(&reward()).unwrap(), milli(299_010));
    println!("✓ 0.1% fee collected, 0.9% burned");
}

// =============================================================================
// TEST 3: WHITELIST BYPASS
// =============================================================================

#[test]
fn test_whitelisted_parties_pay_no_fee() {
    println!("\n=== TEST 3: Whitelist Bypass ===");
    let mut ledger = reward_ledger();
    ledger.mint(&reward(), &acct("alice"), &acct("alice"), tokens(100)).unwrap();
    ledger.mint(&reward(), &acct("alice"), &acct("bob"), tokens(200)).unwrap();

    ledger.set_whitelisted(&reward(), &acct("alice"), acct("alice"), true).unwrap();
    ledger.transfer(&reward(), &acct("alice"), &acct("carol"), tokens(10)).unwrap();

    ledger.set_whitelisted(&reward(), &acct("alice"), acct("carol"), true).unwrap();
    ledger.transfer(&reward(), &acct("bob"), &acct("carol"), tokens(100)).unwrap();
    ledger.set_whitelisted(&reward(), &acct("alice"), acct("carol"), false).unwrap();

    assert_eq!(ledger.total_supply(&reward()).unwrap(), tokens(300));
    assert_eq!(balance(&ledger, "carol"), tokens(110));
    assert_eq!(balance(&ledger, "fee"), 0);

    ledger.transfer(&reward(), &acct("bob"), &acct("carol"), tokens(1)).unwrap();
    assert_eq!(balance(&ledger, "carol"), milli(110_990));
    assert_eq!(balance(&ledger, "fee"), milli(1));
    assert_eq!(ledger.total_supply(&reward()).unwrap(), milli(299_991));

    let denied = ledger.set_whitelisted(&reward(), &acct("bob"), acct("bob"), true);
    assert!(matches!(denied, Err(LedgerError::Unauthorized { .. })));
    println!("✓ Whitelisted sender or receiver bypasses the fee");
}

// =============================================================================
// TEST 4: HARD CAP
// =============================================================================

#[test]
fn test_hard_cap_blocks_excess_mint() {
    println!("\n=== TEST 4: Hard Cap ===");
    let mut ledger = reward_ledger();
    ledger.mint(&reward(), &acct("alice"), &acct("alice"), tokens(100)).unwrap();
    ledger.mint(&reward(), &acct("alice"), &acct("bob"), tokens(200)).unwrap();
    ledger.transfer(&reward(), &acct("alice"), &acct("carol"), tokens(10)).unwrap();
    ledger.transfer(&reward(), &acct("bob"), &acct("carol"), tokens(100)).unwrap();

    let over = ledger.mint(&reward(), &acct("alice"), &acct("bob"), tokens(500_000));
    assert!(matches!(over, Err(LedgerError::HardCapExceeded { .. })));

    ledger.mint(&reward(), &acct("alice"), &acct("bob"), tokens(499_700)).unwrap();
    let supply = ledger.total_supply(&reward()).unwrap();
    println!("  supply after top-up: {}", supply);
    assert!(supply <= tokens(500_000));

    let over = ledger.mint(&reward(), &acct("alice"), &acct("bob"), tokens(1));
    assert!(matches!(over, Err(LedgerError::HardCapExceeded { .. })));
    println!("✓ Supply never exceeds the hard cap");
}

// =============================================================================
// TEST 5: BAD TRANSFERS
// =============================================================================

#[test]
fn test_bad_transfers_fail_cleanly() {
    println!("\n=== TEST 5: Bad Transfers ===");
    let mut ledger = reward_ledger();
    ledger.mint(&reward(), &acct("alice"), &acct("alice"), tokens(100)).unwrap();

    let too_much = ledger.transfer(&reward(), &acct("alice"), &acct("carol"), tokens(110));
    assert!(matches!(too_much, Err(LedgerError::InsufficientBalance { .. })));
    let empty = ledger.transfer(&reward(), &acct("bob"), &acct("carol"), 1);
    assert!(matches!(empty, Err(LedgerError::InsufficientBalance { .. })));

    assert_eq!(balance(&ledger, "alice"), tokens(100));
    assert_eq!(balance(&ledger, "carol"), 0);
    assert_eq!(ledger.total_supply(&reward()).unwrap(), tokens(100));
    println!("✓ Rejected transfers leave no trace");
}

// =============================================================================
// TEST 6: FEE RECIPIENT AND OWNER BURN
// =============================================================================

#[test]
fn test_fee_recipient_moves_and_owner_burns() {
    println!("\n=== TEST 6: Fee Recipient and Burn ===");
    let mut ledger = reward_ledger();
    ledger.mint(&reward(), &acct("alice"), &acct("bob"), tokens(100)).unwrap();

    let denied = ledger.set_fee_recipient(&reward(), &acct("bob"), acct("bob"));
    assert!(matches!(denied, Err(LedgerError::Unauthorized { .. })));
    let empty = ledger.set_fee_recipient(&reward(), &acct("alice"), acct(""));
    assert!(matches!(empty, Err(LedgerError::InvalidPolicy(_))));

    ledger
        .set_fee_recipient(&reward(), &acct("alice"), acct("treasury"))
        .unwrap();
    ledger.transfer(&reward(), &acct("bob"), &acct("carol"), tokens(10)).unwrap();
    assert_eq!(balance(&ledger, "treasury"), milli(10));
    assert_eq!(balance(&ledger, "fee"), 0);

    ledger.burn(&reward(), &acct("alice"), &acct("carol"), tokens(5)).unwrap();
    assert_eq!(balance(&ledger, "carol"), milli(4_900));
    println!("  supply after burn: {}", ledger.total_supply(&reward()).unwrap());
    assert_eq!(
        ledger.total_supply(&reward()).unwrap(),
        tokens(100) - milli(90) - tokens(5)
    );
    println!("✓ Only the admin redirects fees or burns");
}

// =============================================================================
// TEST 7: POLICY PERSISTENCE
// =============================================================================

#[test]
fn test_policy_and_quote_survive_json() {
    println!("\n=== TEST 7: Policy Persistence ===");
    let ledger = reward_ledger();
    let policy = ledger.policy(&reward()).unwrap().clone();

    let json = serde_json::to_string(&policy).unwrap();
    let restored: TokenPolicy = serde_json::from_str(&json).unwrap();
    assert_eq!(restored, policy);

    let quote = ledger
        .quote_transfer(&reward(), &acct("bob"), &acct("carol"), tokens(110))
        .unwrap();
    let value = serde_json::to_value(quote).unwrap();
    assert_eq!(value["fee"], serde_json::json!(milli(110)));
    println!("✓ Policies and quotes serialize without loss");
}
