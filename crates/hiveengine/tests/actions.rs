//! Write actions of the contract wrappers, checked through dry-run payloads.

mod common;

use common::{api, contract_body, dry_run, signer, standard};
use hiveengine::ops::dry_run_body;
use hiveengine::{
    Collection, EngineError, IssueOptions, LiquidityPool, Market, Nft, NftMarket, NftRef,
    OrderType, PartyType, PropertyOptions, Quantity, TokenPair, TradeType, Wallet,
};
use serde_json::json;

fn q(s: &str) -> Quantity {
    s.parse().unwrap()
}

// ── wallet ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn wallet_transfer_builds_tokens_transfer() {
    let api = api(standard());
    let (submitter, broadcaster) = dry_run();
    let wallet = Wallet::load(&api, "alice").await.unwrap().with_submitter(submitter);
    assert_eq!(wallet.balances().len(), 3);

    let result = wallet.transfer("bob", &q("1.5"), "bee", "hi").await.unwrap();
    assert_eq!(
        contract_body(&result),
        json!({
            "contractName": "tokens",
            "contractAction": "transfer",
            "contractPayload": {"symbol": "BEE", "to": "bob", "quantity": "1.50000000", "memo": "hi"}
        })
    );
    assert_eq!(signer(&result), (json!(["alice"]), json!([])));
    assert_eq!(dry_run_body(&result).unwrap()["id"], "ssc-mainnet-hive");
    assert_eq!(broadcaster.operations().len(), 1);
}

#[tokio::test]
async fn wallet_transfer_validation() {
    let api = api(standard());
    let wallet = Wallet::load(&api, "alice").await.unwrap();

    let err = wallet.transfer("bob", &q("1"), "XYZ", "").await.unwrap_err();
    assert!(matches!(err, EngineError::TokenNotInWallet { ref symbol } if symbol == "XYZ"));

    let err = wallet.transfer("bob", &q("100"), "BEE", "").await.unwrap_err();
    assert!(matches!(err, EngineError::InsufficientTokenAmount { ref symbol, .. } if symbol == "BEE"));

    let err = wallet.transfer("bob", &q("0.0001"), "ALC", "").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidTokenAmount { precision: 3 }));

    let err = wallet.transfer("B", &q("1"), "BEE", "").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAccountName { .. }));
}

#[tokio::test]
async fn wallet_rejects_invalid_account() {
    let api = api(standard());
    let err = Wallet::load(&api, "Not_Valid").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidAccountName { .. }));
}

#[tokio::test]
async fn wallet_issue_checks_issuer_and_supply() {
    let api = api(standard());
    let (submitter, _) = dry_run();
    let wallet = Wallet::load(&api, "alice").await.unwrap().with_submitter(submitter);

    let result = wallet.issue("bob", &q("5"), "ALC").await.unwrap();
    assert_eq!(
        contract_body(&result)["contractPayload"],
        json!({"symbol": "ALC", "to": "bob", "quantity": "5.000"})
    );

    let err = wallet.issue("bob", &q("1"), "BEE").await.unwrap_err();
    assert!(matches!(err, EngineError::TokenIssueNotPermitted { .. }));

    let err = wallet.issue("bob", &q("1"), "FULL").await.unwrap_err();
    assert!(matches!(err, EngineError::MaxSupplyReached { .. }));

    let err = wallet.issue("bob", &q("1"), "NOPE").await.unwrap_err();
    assert!(matches!(err, EngineError::TokenDoesNotExist(ref s) if s == "NOPE"));
}

#[tokio::test]
async fn wallet_stake_and_delegate() {
    let api = api(standard());
    let (submitter, _) = dry_run();
    let wallet = Wallet::load(&api, "alice").await.unwrap().with_submitter(submitter);

    let result = wallet.stake(&q("1"), "BEE", None).await.unwrap();
    assert_eq!(contract_body(&result)["contractPayload"]["to"], "alice");

    let err = wallet.delegate("bob", &q("3"), "BEE").await.unwrap_err();
    assert!(matches!(err, EngineError::InsufficientTokenAmount { .. }));

    let result = wallet.delegate("bob", &q("1"), "BEE").await.unwrap();
    assert_eq!(contract_body(&result)["contractAction"], "delegate");

    let result = wallet.undelegate("bob", &q("1"), "BEE").await.unwrap();
    assert_eq!(contract_body(&result)["contractPayload"]["from"], "bob");

    let result = wallet.cancel_unstake("abc123").await.unwrap();
    assert_eq!(contract_body(&result)["contractPayload"], json!({"txID": "abc123"}));
}

#[tokio::test]
async fn set_id_changes_custom_json_id() {
    let api = api(standard());
    let mut wallet = Wallet::load(&api, "alice").await.unwrap();
    wallet.set_id("ssc-testnet-hive");
    let result = wallet.transfer("bob", &q("1"), "BEE", "").await.unwrap();
    assert_eq!(dry_run_body(&result).unwrap()["id"], "ssc-testnet-hive");
}

// ── market ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn market_buy_needs_enough_swap_hive() {
    let api = api(standard());
    let (submitter, _) = dry_run();
    let market = Market::load(&api).await.unwrap().with_submitter(submitter);

    let err = market.buy("alice", &q("10"), "BEE", &q("0.6")).await.unwrap_err();
    assert!(matches!(err, EngineError::InsufficientTokenAmount { ref symbol, .. } if symbol == "SWAP.HIVE"));

    let result = market.buy("alice", &q("5"), "BEE", &q("0.5")).await.unwrap();
    assert_eq!(
        contract_body(&result),
        json!({
            "contractName": "market",
            "contractAction": "buy",
            "contractPayload": {"symbol": "BEE", "quantity": "5.00000000", "price": "0.5"}
        })
    );
}

#[tokio::test]
async fn market_cancel_and_unknown_symbol() {
    let api = api(standard());
    let market = Market::load(&api).await.unwrap();

    let result = market.cancel("alice", OrderType::Sell, "trx-1").await.unwrap();
    assert_eq!(
        contract_body(&result)["contractPayload"],
        json!({"type": "sell", "id": "trx-1"})
    );

    let err = market.get_buy_book("NOPE", None, 100, 0).await.unwrap_err();
    assert!(matches!(err, EngineError::TokenDoesNotExist(_)));
}

#[tokio::test]
async fn market_deposit_sends_hive_to_peg_account() {
    let api = api(standard());
    let (submitter, broadcaster) = dry_run();
    let market = Market::load(&api).await.unwrap().with_submitter(submitter);

    market.deposit("alice", &q("1.5")).await.unwrap();
    let ops = broadcaster.operations();
    assert_eq!(ops[0][0], "transfer");
    assert_eq!(ops[0][1]["to"], "honey-swap");
    assert_eq!(ops[0][1]["amount"], "1.500 HIVE");

    assert_eq!(
        ops[0][1]["memo"],
        r#"{"id":"ssc-mainnet-hive","json":{"contractName":"hivepegged","contractAction":"buy","contractPayload":{}}}"#
    );

    assert!(market.deposit("alice", &q("0.0001")).await.is_err());
}

// ── liquidity pools ─────────────────────────────────────────────────────────

#[tokio::test]
async fn remove_liquidity_bounds() {
    let api = api(standard());
    let pool = LiquidityPool::load(&api).await.unwrap();
    let pair: TokenPair = "SWAP.HIVE:BEE".parse().unwrap();

    for bad in ["0", "100.01", "-5"] {
        let err = pool.remove_liquidity("alice", &pair, &q(bad)).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)), "{bad}");
    }
    let result = pool.remove_liquidity("alice", &pair, &q("100")).await.unwrap();
    assert_eq!(
        contract_body(&result)["contractPayload"],
        json!({"tokenPair": "SWAP.HIVE:BEE", "sharesOut": "100"})
    );
}

#[tokio::test]
async fn reward_pool_bounds() {
    let api = api(standard());
    let pool = LiquidityPool::load(&api).await.unwrap();
    let pair: TokenPair = "SWAP.HIVE:BEE".parse().unwrap();

    assert!(pool
        .create_reward_pool("alice", &pair, 21, 24, &q("1"), "bee")
        .await
        .is_err());
    assert!(pool
        .create_reward_pool("alice", &pair, 5, 721, &q("1"), "bee")
        .await
        .is_err());

    let result = pool
        .create_reward_pool("alice", &pair, 20, 720, &q("1"), "bee")
        .await
        .unwrap();
    assert_eq!(contract_body(&result)["contractPayload"]["minedToken"], "BEE");
}

#[tokio::test]
async fn swap_exact_input_with_minimum() {
    let api = api(standard());
    let pool = LiquidityPool::load(&api).await.unwrap();
    let pair: TokenPair = "SWAP.HIVE:BEE".parse().unwrap();

    let result = pool
        .swap_tokens(
            "alice",
            &pair,
            "SWAP.HIVE",
            &q("1"),
            TradeType::ExactInput,
            Some(&q("2")),
            Some(&q("9")),
        )
        .await
        .unwrap();
    assert_eq!(
        contract_body(&result)["contractPayload"],
        json!({
            "tokenPair": "SWAP.HIVE:BEE",
            "tokenSymbol": "SWAP.HIVE",
            "tokenAmount": "1.00000000",
            "tradeType": "exactInput",
            "minAmountOut": "2"
        })
    );

    let err = pool
        .swap_tokens("alice", &pair, "SWAP.HIVE", &q("50"), TradeType::ExactInput, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InsufficientTokenAmount { .. }));
}

// ── nfts ────────────────────────────────────────────────────────────────────

fn nft_fixtures() -> common::Fixtures {
    standard()
        .with(
            "nft",
            "nfts",
            vec![json!({
                "_id": 1,
                "issuer": "cryptomancer",
                "symbol": "STAR",
                "name": "Stars",
                "properties": {"color": {"type": "string", "isReadOnly": false}},
                "groupBy": []
            })],
        )
        .with(
            "nft",
            "STARinstances",
            vec![
                json!({"_id": 1, "account": "alice", "ownedBy": "u", "properties": {"color": "red"}}),
                json!({"_id": 2, "account": "alice", "ownedBy": "u", "properties": {"color": "blue"}}),
                json!({"_id": 3, "account": "bob", "ownedBy": "u", "properties": {}}),
            ],
        )
}

#[tokio::test]
async fn nft_load_and_unknown_symbol() {
    let api = api(nft_fixtures());
    let nft = Nft::load(&api, "star").await.unwrap();
    assert_eq!(nft.issuer(), "cryptomancer");
    assert_eq!(nft.properties(), ["color"]);
    assert_eq!(nft.get_collection("alice").await.unwrap().len(), 2);
    assert_eq!(nft.get_id(3).await.unwrap().unwrap()["account"], "bob");

    let err = Nft::load(&api, "nope").await.unwrap_err();
    assert!(matches!(err, EngineError::NftDoesNotExist(ref s) if s == "NOPE"));
}

#[tokio::test]
async fn nft_issuer_actions() {
    let api = api(nft_fixtures());
    let (submitter, _) = dry_run();
    let nft = Nft::load(&api, "STAR").await.unwrap().with_submitter(submitter);

    let result = nft.update_url("https://stars.example").await.unwrap();
    assert_eq!(signer(&result), (json!([]), json!(["cryptomancer"])));
    assert_eq!(
        contract_body(&result)["contractPayload"],
        json!({"symbol": "STAR", "url": "https://stars.example"})
    );

    let result = nft.set_group_by(&["color"]).await.unwrap();
    assert_eq!(signer(&result), (json!(["cryptomancer"]), json!([])));
    assert_eq!(
        contract_body(&result)["contractPayload"],
        json!({"symbol": "STAR", "properties": ["color"]})
    );

    let result = nft
        .add_property(
            "level",
            "number",
            PropertyOptions {
                is_read_only: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(
        contract_body(&result)["contractPayload"],
        json!({"symbol": "STAR", "name": "level", "type": "number", "isReadOnly": true})
    );
    assert!(nft.add_property("level", "float", PropertyOptions::default()).await.is_err());

    let result = nft
        .set_properties(vec![json!({"id": "1", "properties": {"color": "green"}})], None, Some("editor"))
        .await
        .unwrap();
    assert_eq!(contract_body(&result)["contractAction"], "setProperties");
    assert_eq!(signer(&result), (json!([]), json!(["editor"])));
}

#[tokio::test]
async fn nft_issue_uses_authorized_account() {
    let api = api(nft_fixtures());
    let (submitter, _) = dry_run();
    let nft = Nft::load(&api, "STAR").await.unwrap().with_submitter(submitter);

    let result = nft
        .issue(
            "alice",
            "bee",
            IssueOptions {
                to_type: Some(PartyType::User),
                properties: Some(json!({"color": "red"})),
                authorized_account: Some("minter".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(signer(&result).0, json!(["minter"]));
    assert_eq!(
        contract_body(&result)["contractPayload"],
        json!({
            "symbol": "STAR",
            "to": "alice",
            "feeSymbol": "BEE",
            "toType": "user",
            "properties": {"color": "red"}
        })
    );

    let result = nft.issue_multiple(vec![json!({"symbol": "STAR", "to": "bob", "feeSymbol": "BEE"})], None).await.unwrap();
    let body = contract_body(&result);
    assert_eq!(body["contractAction"], "issueMultiple");
    assert!(body["contractPayload"].get("symbol").is_none());
}

#[tokio::test]
async fn collection_groups_owned_instances() {
    let api = api(nft_fixtures());
    let (submitter, _) = dry_run();
    let collection = Collection::load(&api, "alice").await.unwrap().with_submitter(submitter);

    assert_eq!(collection.collection()["STAR"].len(), 2);
    assert_eq!(collection.get_nft(2, "star").unwrap()["properties"]["color"], "blue");
    assert!(collection.get_nft(3, "STAR").is_none());

    let nfts = [NftRef::new("star", ["1", "2"])];
    let result = collection
        .transfer("market", &nfts, PartyType::User, PartyType::Contract)
        .await
        .unwrap();
    assert_eq!(
        contract_body(&result)["contractPayload"],
        json!({
            "to": "market",
            "nfts": [{"symbol": "STAR", "ids": ["1", "2"]}],
            "toType": "contract"
        })
    );

    assert!(collection.burn(&[]).await.is_err());
}

#[tokio::test]
async fn nft_market_actions() {
    let api = api(nft_fixtures());
    let (submitter, _) = dry_run();
    let market = NftMarket::new(&api).with_submitter(submitter);

    let result = market
        .sell("alice", "star", &["1"], &q("2.5"), "swap.hive", 500)
        .await
        .unwrap();
    assert_eq!(
        contract_body(&result),
        json!({
            "contractName": "nftmarket",
            "contractAction": "sell",
            "contractPayload": {
                "symbol": "STAR", "nfts": ["1"], "price": "2.5", "priceSymbol": "SWAP.HIVE", "fee": 500
            }
        })
    );

    assert!(market
        .sell("alice", "STAR", &["1"], &q("1"), "BEE", 10_001)
        .await
        .is_err());
    assert!(market.cancel("alice", "STAR", &[]).await.is_err());

    let result = market.buy("bob", "STAR", &["1"], "nftmarket").await.unwrap();
    assert_eq!(contract_body(&result)["contractPayload"]["marketAccount"], "nftmarket");
}
