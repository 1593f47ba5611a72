//! # Integration Test Flows
//!
//! Registry, role handlers, coordinator and host bridge exercised together
//! over the three-chain scenario.
//!
//! ## Flows Tested:
//!
//! 1. **Contract → host bridge → coordinator → target engine** with packed
//!    pointers and JSON envelopes in guest memory
//! 2. **Role-addressed calls** resolved through the registry
//! 3. **Atomic markers** observed sequentially and under contention
//! 4. **Registry removal** serialized against in-flight calls
//! 5. **Non-deterministic calls** staged in the side channel

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use mc_01_packed_pointer::{read_json, write_json, GuestMemory, PackedPtr};
    use mc_03_subchain_registry::{RegisterDefaultSubChainRequest, RegistryError, MYTHOS_PREFIX};
    use mc_04_contract_handler::{
        AliasRequest, AliasResponse, BankRequest, BankResponse, ContractCall, ContractEngine,
        EngineError, HandlerMessage, HandlerRequest, HandlerResponse, KvRequest,
    };
    use mc_05_cross_chain::{
        CallContext, CrossChainApi, CrossChainCallRequest, CrossChainCallResponse,
        CrossChainConfig, CrossChainError, HostBridge, NonDeterministicTxResponse,
    };
    use parking_lot::Mutex;
    use shared_types::{Coin, TxHash};

    use crate::integration::scenario::*;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Engine that blocks inside `execute` until released.
    struct GateEngine {
        entered: Mutex<Option<mpsc::Sender<()>>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl ContractEngine for GateEngine {
        fn query(&self, call: &ContractCall) -> Result<Vec<u8>, EngineError> {
            self.execute(call)
        }

        fn execute(&self, _call: &ContractCall) -> Result<Vec<u8>, EngineError> {
            if let Some(entered) = self.entered.lock().take() {
                let _ = entered.send(());
            }
            self.release
                .lock()
                .recv()
                .map_err(|e| EngineError::Execution(e.to_string()))?;
            Ok(b"released".to_vec())
        }
    }

    /// Install a gate on the application chain. Returns the "entered"
    /// receiver and the release sender.
    fn gate(scenario: &Scenario) -> (mpsc::Receiver<()>, mpsc::Sender<()>) {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        scenario.router.register(
            app(),
            Arc::new(GateEngine {
                entered: Mutex::new(Some(entered_tx)),
                release: Mutex::new(release_rx),
            }),
        );
        (entered_rx, release_tx)
    }

    // =============================================================================
    // HOST BRIDGE
    // =============================================================================

    #[test]
    fn test_contract_calls_other_chain_through_guest_memory() {
        let scenario = Scenario::new();
        let bridge = HostBridge::new(scenario.coordinator.clone());
        let mut memory = GuestMemory::new(1, 8);
        let ctx = scenario.tx_ctx(b"tx-bridge");

        let req = scenario.kv_request(KvRequest::Set {
            key: "greeting".into(),
            value: "hello".into(),
        });
        let ptr: i64 = write_json(&mut memory, &req).unwrap().into();
        let out = bridge.execute_cross_chain_tx(&ctx, &mut memory, ptr).unwrap();
        let resp: CrossChainCallResponse = read_json(&memory, PackedPtr::from(out)).unwrap();
        assert!(resp.is_ok(), "{}", resp.error);
        assert_eq!(resp.data, b"hello");

        // Committed on the target: a later query sees it.
        let req = scenario.kv_request(KvRequest::Get {
            key: "greeting".into(),
        });
        let ptr: i64 = write_json(&mut memory, &req).unwrap().into();
        let out = bridge
            .execute_cross_chain_query(&scenario.query_ctx(), &mut memory, ptr)
            .unwrap();
        let resp: CrossChainCallResponse = read_json(&memory, PackedPtr::from(out)).unwrap();
        assert_eq!(resp.data, b"hello");
    }

    #[test]
    fn test_remote_failure_reaches_contract_verbatim() {
        let scenario = Scenario::new();
        let bridge = HostBridge::new(scenario.coordinator.clone());
        let mut memory = GuestMemory::new(1, 8);

        let req = scenario.kv_request(KvRequest::Fail {
            reason: "insufficient funds".into(),
        });
        let ptr: i64 = write_json(&mut memory, &req).unwrap().into();
        let out = bridge
            .execute_cross_chain_tx(&scenario.tx_ctx(b"tx-fail"), &mut memory, ptr)
            .unwrap();
        let resp: CrossChainCallResponse = read_json(&memory, PackedPtr::from(out)).unwrap();
        assert_eq!(resp.error, "insufficient funds");
        assert!(resp.data.is_empty());
    }

    // =============================================================================
    // DETERMINISTIC TIMEOUTS AND CYCLES
    // =============================================================================

    #[test]
    fn test_zero_timeout_to_unreachable_chain_is_deterministic() {
        let scenario = Scenario::new();
        let ghost = chain("ghost_4242-1");
        let outcomes: Vec<_> = (0..3)
            .map(|_| {
                let mut req = scenario
                    .kv_request(KvRequest::Get { key: "k".into() })
                    .with_timeout_ms(0);
                req.to_chain_id = ghost.clone();
                scenario
                    .coordinator
                    .execute_cross_chain_tx(&scenario.tx_ctx(b"tx-zero"), req)
            })
            .collect();
        for outcome in &outcomes {
            assert_eq!(
                outcome,
                &Err(CrossChainError::TimedOut {
                    chain_id: ghost.clone(),
                    budget_blocks: 0
                })
            );
        }
    }

    #[test]
    fn test_cycle_rejected_before_any_state_change() {
        let scenario = Scenario::new();
        let req = scenario
            .kv_request(KvRequest::Set {
                key: "k".into(),
                value: "v".into(),
            })
            .with_dependencies(vec![root(), mythos()]);
        let err = scenario
            .coordinator
            .execute_cross_chain_tx(&scenario.tx_ctx(b"tx-cycle"), req)
            .unwrap_err();
        assert_eq!(
            err,
            CrossChainError::DependencyCycle {
                path: vec![mythos(), mythos()]
            }
        );

        let got = scenario
            .coordinator
            .execute_cross_chain_query(
                &scenario.query_ctx(),
                scenario.kv_request(KvRequest::Get { key: "k".into() }),
            )
            .unwrap();
        assert!(got.is_empty());
        assert!(scenario.coordinator.in_flight().active_calls().is_empty());
        assert_eq!(scenario.coordinator.in_flight().active_markers(), 0);
    }

    #[test]
    fn test_nested_call_depth_bounded() {
        let scenario = Scenario::with_config(CrossChainConfig::default().with_max_call_depth(2));
        let mut ctx = scenario.tx_ctx(b"tx-deep");
        ctx.call_path = vec![root(), app()];
        let err = scenario
            .coordinator
            .execute_cross_chain_tx(
                &ctx,
                scenario.kv_request(KvRequest::Get { key: "k".into() }),
            )
            .unwrap_err();
        assert_eq!(err, CrossChainError::CallDepthExceeded { depth: 3, max: 2 });
    }

    // =============================================================================
    // ROLE-ADDRESSED CALLS
    // =============================================================================

    #[test]
    fn test_bank_role_across_chains() {
        let scenario = Scenario::new();
        let user = account(MYTHOS_PREFIX, USER);
        let recipient = account(APP_PREFIX, OTHER);

        let resp = scenario
            .coordinator
            .execute_role_call(
                &scenario.tx_ctx(b"tx-bank"),
                &user,
                &app(),
                &HandlerRequest::Bank(BankRequest::Send {
                    to: recipient.clone(),
                    amount: vec![Coin::new(APP_DENOM, 250)],
                }),
            )
            .unwrap();
        assert_eq!(resp, HandlerResponse::Bank(BankResponse::Sent));

        // Same state seen through the chain-local handler map.
        let handlers = scenario.app_handlers();
        let balance = |address: String| {
            handlers
                .query(&HandlerMessage::new(
                    app(),
                    "anyone",
                    HandlerRequest::Bank(BankRequest::GetBalance {
                        address,
                        denom: APP_DENOM.into(),
                    }),
                ))
                .unwrap()
        };
        assert_eq!(
            balance(recipient),
            HandlerResponse::Bank(BankResponse::Balance(Coin::new(APP_DENOM, 250)))
        );
        assert_eq!(
            balance(account(APP_PREFIX, USER)),
            HandlerResponse::Bank(BankResponse::Balance(Coin::new(APP_DENOM, USER_BALANCE - 250)))
        );
    }

    #[test]
    fn test_bank_overdraft_is_remote_error() {
        let scenario = Scenario::new();
        let err = scenario
            .coordinator
            .execute_role_call(
                &scenario.tx_ctx(b"tx-overdraft"),
                &account(MYTHOS_PREFIX, OTHER),
                &app(),
                &HandlerRequest::Bank(BankRequest::Send {
                    to: account(APP_PREFIX, USER),
                    amount: vec![Coin::new(APP_DENOM, 1)],
                }),
            )
            .unwrap_err();
        match err {
            CrossChainError::RemoteExecutionError(msg) => assert!(msg.starts_with("insufficient funds")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_alias_registered_remotely_visible_locally() {
        let scenario = Scenario::new();
        scenario
            .coordinator
            .execute_role_call(
                &scenario.tx_ctx(b"tx-alias"),
                &account(MYTHOS_PREFIX, USER),
                &app(),
                &HandlerRequest::Alias(AliasRequest::Register {
                    eth_address: "0xDEADbeef".into(),
                    coin_type: 60,
                }),
            )
            .unwrap();

        let local = scenario
            .app_handlers()
            .query(&HandlerMessage::new(
                app(),
                "anyone",
                HandlerRequest::Alias(AliasRequest::GetCosmosAddress {
                    eth_address: "0xdeadbeef".into(),
                    coin_type: 60,
                }),
            ))
            .unwrap();
        assert_eq!(
            local,
            HandlerResponse::Alias(AliasResponse::CosmosAddress {
                found: true,
                cosm_address: account(APP_PREFIX, USER),
            })
        );
    }

    #[test]
    fn test_role_missing_on_target_chain() {
        let scenario = Scenario::new();
        let err = scenario
            .coordinator
            .query_role_call(
                &scenario.query_ctx(),
                &account(MYTHOS_PREFIX, USER),
                &mythos(),
                &HandlerRequest::Bank(BankRequest::GetBalance {
                    address: "x".into(),
                    denom: "amyt".into(),
                }),
            )
            .unwrap_err();
        match err {
            CrossChainError::Handler(e) => assert!(e.is_role_not_registered()),
            other => panic!("unexpected error {other:?}"),
        }
    }

    // =============================================================================
    // ATOMIC MARKERS AND REGISTRY SERIALIZATION
    // =============================================================================

    #[test]
    fn test_marker_and_removal_while_call_blocked() {
        let scenario = Scenario::new();
        let (entered, release) = gate(&scenario);
        let coordinator = scenario.coordinator.clone();
        let ctx = scenario.tx_ctx(b"tx-gate");
        let hash = TxHash::from_tx_bytes(b"tx-gate");
        let req = scenario.kv_request(KvRequest::Get { key: "k".into() });

        let worker = thread::spawn(move || coordinator.execute_cross_chain_tx(&ctx, req));
        entered.recv_timeout(Duration::from_secs(5)).unwrap();

        assert!(scenario.coordinator.is_atomic_tx_in_execution(&app(), &hash));
        assert!(!scenario.coordinator.is_atomic_tx_in_execution(&mythos(), &hash));

        // Same tx on the same target cannot start again.
        let again = scenario.coordinator.execute_cross_chain_tx(
            &scenario.tx_ctx(b"tx-gate"),
            scenario.kv_request(KvRequest::Get { key: "k".into() }),
        );
        assert_eq!(
            again,
            Err(CrossChainError::AtomicReentry {
                chain_id: app(),
                tx_hash: hash
            })
        );

        // Neither end of the call can be removed meanwhile.
        assert_eq!(
            scenario.registry.remove_subchain(&app()),
            Err(RegistryError::ChainInFlight(app()))
        );
        assert_eq!(
            scenario.registry.remove_subchain(&mythos()),
            Err(RegistryError::ChainInFlight(mythos()))
        );

        release.send(()).unwrap();
        assert_eq!(worker.join().unwrap().unwrap(), b"released");

        assert!(!scenario.coordinator.is_atomic_tx_in_execution(&app(), &hash));
        scenario.registry.remove_subchain(&app()).unwrap();
        assert!(!scenario.registry.contains(&app()));
    }

    #[test]
    fn test_concurrent_same_tx_single_execution() {
        let scenario = Scenario::new();
        let (entered, release) = gate(&scenario);
        let first = {
            let coordinator = scenario.coordinator.clone();
            let ctx = scenario.tx_ctx(b"tx-race");
            let req = scenario.kv_request(KvRequest::Get { key: "k".into() });
            thread::spawn(move || coordinator.execute_cross_chain_tx(&ctx, req))
        };
        entered.recv_timeout(Duration::from_secs(5)).unwrap();

        let contenders: Vec<_> = (0..4)
            .map(|_| {
                let coordinator = scenario.coordinator.clone();
                let ctx = scenario.tx_ctx(b"tx-race");
                let req = scenario.kv_request(KvRequest::Get { key: "k".into() });
                thread::spawn(move || coordinator.execute_cross_chain_tx(&ctx, req))
            })
            .collect();
        for contender in contenders {
            assert!(matches!(
                contender.join().unwrap(),
                Err(CrossChainError::AtomicReentry { .. })
            ));
        }

        release.send(()).unwrap();
        assert!(first.join().unwrap().is_ok());
        assert_eq!(scenario.coordinator.in_flight().active_markers(), 0);
    }

    #[test]
    fn test_distinct_txs_run_side_by_side() {
        let scenario = Scenario::new();
        let (entered, release) = gate(&scenario);
        let first = {
            let coordinator = scenario.coordinator.clone();
            let ctx = scenario.tx_ctx(b"tx-a");
            let req = scenario.kv_request(KvRequest::Get { key: "k".into() });
            thread::spawn(move || coordinator.execute_cross_chain_tx(&ctx, req))
        };
        entered.recv_timeout(Duration::from_secs(5)).unwrap();

        // A different tx hash takes its own marker; a query takes none. Both
        // reach the gated engine, so release three times.
        let second = {
            let coordinator = scenario.coordinator.clone();
            let ctx = scenario.tx_ctx(b"tx-b");
            let req = scenario.kv_request(KvRequest::Get { key: "k".into() });
            thread::spawn(move || coordinator.execute_cross_chain_tx(&ctx, req))
        };
        let third = {
            let coordinator = scenario.coordinator.clone();
            let ctx = scenario.query_ctx();
            let req = scenario.kv_request(KvRequest::Get { key: "k".into() });
            thread::spawn(move || coordinator.execute_cross_chain_query(&ctx, req))
        };
        for _ in 0..3 {
            release.send(()).unwrap();
        }
        assert!(first.join().unwrap().is_ok());
        assert!(second.join().unwrap().is_ok());
        assert!(third.join().unwrap().is_ok());
    }

    #[test]
    fn test_default_subchain_becomes_reachable_once_hosted() {
        let scenario = Scenario::new();
        let new_chain = scenario
            .registry
            .register_default_subchain(&RegisterDefaultSubChainRequest {
                chain_base_name: "game".into(),
                denom_unit: "gm".into(),
                base_denom_unit: 18,
                parent_id: root(),
                coin_type: None,
            })
            .unwrap();

        let mut req = scenario.kv_request(KvRequest::Get { key: "k".into() });
        req.to_chain_id = new_chain.clone();
        assert_eq!(
            scenario
                .coordinator
                .execute_cross_chain_query(&scenario.query_ctx(), req.clone()),
            Err(CrossChainError::ChainUnreachable(new_chain.clone()))
        );

        let engine = Arc::new(
            mc_04_contract_handler::InMemoryContractEngine::new(new_chain.clone()).with_contract(
                account("game", KV),
                mc_04_contract_handler::NativeContract::kv_store(),
            ),
        );
        scenario.router.register(new_chain.clone(), engine);
        assert!(scenario
            .coordinator
            .execute_cross_chain_query(&scenario.query_ctx(), req)
            .is_ok());
    }

    // =============================================================================
    // NON-DETERMINISTIC CALLS
    // =============================================================================

    #[tokio::test]
    async fn test_non_deterministic_tx_merged_explicitly() {
        let scenario = Scenario::new();
        let ctx = scenario.tx_ctx(b"tx-nd");
        let call_id = scenario
            .coordinator
            .execute_cross_chain_tx_non_deterministic(
                &ctx,
                scenario.kv_request(KvRequest::Set {
                    key: "nd".into(),
                    value: "staged".into(),
                }),
            )
            .await;

        let staged = scenario.coordinator.side_channel().wait_take(call_id).await;
        assert!(staged.is_ok());
        assert_eq!(staged.data, b"staged");
        // Taken once; nothing merges it again.
        assert!(scenario.coordinator.side_channel().take(call_id).is_none());
    }

    #[tokio::test]
    async fn test_non_deterministic_query_outside_transaction_only() {
        let scenario = Scenario::new();
        let refused = scenario
            .coordinator
            .execute_cross_chain_query_non_deterministic(
                &scenario.tx_ctx(b"tx-ndq"),
                scenario.kv_request(KvRequest::Get { key: "k".into() }),
            )
            .await;
        assert_eq!(refused, Err(CrossChainError::NonDeterministicInTransaction));

        let staged = scenario
            .coordinator
            .execute_cross_chain_query_non_deterministic(
                &scenario.query_ctx(),
                scenario.kv_request(KvRequest::Get { key: "k".into() }),
            )
            .await
            .unwrap();
        assert!(staged.response.is_ok());
        assert_eq!(
            scenario.coordinator.side_channel().take(staged.call_id),
            Some(staged.response)
        );
    }

    #[tokio::test]
    async fn test_non_deterministic_host_functions_through_guest_memory() {
        let scenario = Scenario::new();
        let bridge = HostBridge::for_coordinator(scenario.coordinator.clone());
        let mut memory = GuestMemory::new(1, 8);

        // Transaction: the reply carries the call id, the outcome is staged.
        let req = scenario.kv_request(KvRequest::Set {
            key: "nd".into(),
            value: "guest".into(),
        });
        let ptr: i64 = write_json(&mut memory, &req).unwrap().into();
        let ctx = scenario.tx_ctx(b"tx-nd-host");
        let out = bridge
            .execute_cross_chain_tx_non_deterministic(&ctx, &mut memory, ptr)
            .await
            .unwrap();
        let reply: NonDeterministicTxResponse = read_json(&memory, PackedPtr::from(out)).unwrap();
        assert!(reply.error.is_empty(), "{}", reply.error);
        let call_id = reply.call_id.unwrap();
        let staged = scenario.coordinator.side_channel().wait_take(call_id).await;
        assert_eq!(staged.data, b"guest");

        // Query outside a transaction answers directly.
        let req = scenario.kv_request(KvRequest::Get { key: "k".into() });
        let ptr: i64 = write_json(&mut memory, &req).unwrap().into();
        let out = bridge
            .execute_cross_chain_query_non_deterministic(&scenario.query_ctx(), &mut memory, ptr)
            .await
            .unwrap();
        let resp: CrossChainCallResponse = read_json(&memory, PackedPtr::from(out)).unwrap();
        assert!(resp.is_ok(), "{}", resp.error);

        // Inside a transaction the query is refused in the envelope.
        let ptr: i64 = write_json(&mut memory, &req).unwrap().into();
        let ctx = scenario.tx_ctx(b"tx-ndq-host");
        let out = bridge
            .execute_cross_chain_query_non_deterministic(&ctx, &mut memory, ptr)
            .await
            .unwrap();
        let resp: CrossChainCallResponse = read_json(&memory, PackedPtr::from(out)).unwrap();
        assert_eq!(resp.error, CrossChainError::NonDeterministicInTransaction.to_string());

        // An unreadable request never fails the contract.
        let ptr: i64 = mc_01_packed_pointer::write_bytes(&mut memory, b"{oops")
            .unwrap()
            .into();
        let ctx = scenario.tx_ctx(b"tx-nd-bad");
        let out = bridge
            .execute_cross_chain_tx_non_deterministic(&ctx, &mut memory, ptr)
            .await
            .unwrap();
        let reply: NonDeterministicTxResponse = read_json(&memory, PackedPtr::from(out)).unwrap();
        assert_eq!(reply.call_id, None);
        assert!(reply.error.starts_with("Encoding error"));
    }

    // =============================================================================
    // TELEMETRY
    // =============================================================================

    #[test]
    fn test_calls_are_counted() {
        mc_telemetry::register_metrics().unwrap();
        let scenario = Scenario::new();
        scenario
            .coordinator
            .execute_cross_chain_query(
                &scenario.query_ctx(),
                scenario.kv_request(KvRequest::Get { key: "k".into() }),
            )
            .unwrap();
        let text = mc_telemetry::gather_metrics().unwrap();
        assert!(text.contains("mc_cross_chain_calls_total"));
    }

    #[test]
    fn test_request_envelope_from_contract_json() {
        let scenario = Scenario::new();
        let json = serde_json::json!({
            "from": account(MYTHOS_PREFIX, USER),
            "to": account(MYTHOS_PREFIX, KV),
            "msg": "",
            "from_chain_id": mythos(),
            "to_chain_id": app(),
        });
        let req: CrossChainCallRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.timeout_ms, None);
        assert!(req.funds.is_empty());
        let ctx: CallContext = scenario.query_ctx();
        // Empty message is not a valid execution envelope on the target.
        assert!(matches!(
            scenario.coordinator.execute_cross_chain_query(&ctx, req),
            Err(CrossChainError::RemoteExecutionError(_))
        ));
    }
}
