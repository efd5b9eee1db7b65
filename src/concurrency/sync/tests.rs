use super::*;
use crate::GhostToken;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_wait_on_u32_wake() {
    let flag = Arc::new(AtomicU32::new(0));
    let barrier = Arc::new(Barrier::new(2));
    let flag_thread = flag.clone();
    let barrier_thread = barrier.clone();

    let handle = thread::spawn(move || {
        barrier_thread.wait();
        while flag_thread.load(Ordering::SeqCst) == 0 {
            wait_on_u32(&flag_thread, 0);
        }
        flag_thread.load(Ordering::SeqCst)
    });

    barrier.wait();
    flag.store(1, Ordering::SeqCst);
    wake_all_u32(&flag);

    let value = handle.join().unwrap();
    assert_eq!(value, 1);
}

#[test]
fn test_wait_returns_when_value_already_changed() {
    let flag = AtomicU32::new(5);
    // Value differs from `expected`, so this must not block.
    wait_on_u32(&flag, 4);
}

fn run_rounds(policy: HandoffPolicy, parties: usize, rounds: usize) {
    GhostToken::new(|token| {
        let handoff = PhaseHandoff::new(&token, parties, policy);
        let arrivals = AtomicUsize::new(0);
        let finishes = AtomicUsize::new(0);
        let finishers_seen = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..parties {
                s.spawn(|| {
                    for round in 0..rounds {
                        arrivals.fetch_add(1, Ordering::Relaxed);
                        let role = handoff
                            .arrive(|| {
                                // Everybody has arrived for this round.
                                assert_eq!(arrivals.load(Ordering::Relaxed), (round + 1) * parties);
                                finishes.fetch_add(1, Ordering::Relaxed);
                            })
                            .unwrap();
                        if role == Role::Finisher {
                            finishers_seen.fetch_add(1, Ordering::Relaxed);
                        }
                        // The finisher's bookkeeping is visible to everyone released.
                        assert_eq!(finishes.load(Ordering::Relaxed), round + 1);
                    }
                });
            }
        });

        assert_eq!(finishes.load(Ordering::Relaxed), rounds);
        assert_eq!(finishers_seen.load(Ordering::Relaxed), rounds);
    });
}

#[test]
fn test_handoff_block_elects_one_finisher_per_round() {
    run_rounds(HandoffPolicy::Block, 4, 200);
}

#[test]
fn test_handoff_spin_elects_one_finisher_per_round() {
    run_rounds(HandoffPolicy::Spin, 4, 200);
}

#[test]
fn test_handoff_single_party_is_always_finisher() {
    GhostToken::new(|token| {
        let handoff = PhaseHandoff::new(&token, 1, HandoffPolicy::Block);
        for _ in 0..10 {
            assert_eq!(handoff.arrive(|| {}), Ok(Role::Finisher));
        }
    });
}

#[test]
fn test_poison_releases_waiters() {
    for policy in HandoffPolicy::ALL {
        GhostToken::new(|token| {
            let handoff = PhaseHandoff::new(&token, 3, policy);
            let handoff = &handoff;
            thread::scope(|s| {
                let waiters: Vec<_> = (0..2)
                    .map(|_| s.spawn(move || handoff.arrive(|| {})))
                    .collect();
                // The third party never arrives; it fails instead.
                thread::sleep(std::time::Duration::from_millis(20));
                handoff.poison();
                for w in waiters {
                    assert_eq!(w.join().unwrap(), Err(Poisoned));
                }
            });
            assert!(handoff.is_poisoned());
            assert_eq!(handoff.arrive(|| {}), Err(Poisoned));
        });
    }
}

#[test]
fn test_panic_guard_poisons_on_unwind() {
    GhostToken::new(|token| {
        let handoff = PhaseHandoff::new(&token, 2, HandoffPolicy::Block);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = handoff.panic_guard();
            panic!("worker failed");
        }));
        assert!(result.is_err());
        assert!(handoff.is_poisoned());
    });
}

#[test]
fn test_policy_parses() {
    assert_eq!("block".parse::<HandoffPolicy>(), Ok(HandoffPolicy::Block));
    assert_eq!("spin".parse::<HandoffPolicy>(), Ok(HandoffPolicy::Spin));
    assert!("busy".parse::<HandoffPolicy>().is_err());
    assert_eq!(HandoffPolicy::default(), HandoffPolicy::Block);
}
