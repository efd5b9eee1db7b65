use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;

use bfs_tale::graph::access::{CuckooFilter, VisitedSet};
use bfs_tale::{GhostToken, HandoffPolicy, Node, PhaseHandoff};

const NODES: usize = 10_000;
const THREADS: usize = 8;

#[test]
fn each_node_has_exactly_one_winner() {
    GhostToken::new(|token| {
        let visited = VisitedSet::new(&token, NODES);
        let wins: Vec<AtomicUsize> = (0..NODES).map(|_| AtomicUsize::new(0)).collect();
        let start = Barrier::new(THREADS);

        thread::scope(|s| {
            for t in 0..THREADS {
                let (visited, wins, start) = (&visited, &wins, &start);
                s.spawn(move || {
                    start.wait();
                    // Every thread walks all nodes, each from a different offset.
                    for i in 0..NODES {
                        let node = ((i + t * 1237) % NODES) as Node;
                        if visited.try_claim(node) {
                            wins[node as usize].fetch_add(1, Ordering::Relaxed);
                        }
                    }
                });
            }
        });

        assert!(wins.iter().all(|w| w.load(Ordering::Relaxed) == 1));
        assert_eq!(visited.claimed(), NODES);
    });
}

#[test]
fn batched_claims_race_with_single_claims() {
    GhostToken::new(|token| {
        let visited = VisitedSet::new(&token, NODES);
        let winners = AtomicUsize::new(0);

        thread::scope(|s| {
            for t in 0..THREADS {
                let (visited, winners) = (&visited, &winners);
                s.spawn(move || {
                    let mut won = 0;
                    if t % 2 == 0 {
                        for chunk in (0..NODES as Node).collect::<Vec<_>>().chunks_exact(4) {
                            let nodes = [chunk[0], chunk[1], chunk[2], chunk[3]];
                            let words = visited.load_words4(nodes);
                            for (word, node) in words.into_iter().zip(nodes) {
                                won += usize::from(visited.try_claim_from(word, node));
                            }
                        }
                    } else {
                        for node in (0..NODES as Node).rev() {
                            won += usize::from(visited.try_claim(node));
                        }
                    }
                    winners.fetch_add(won, Ordering::Relaxed);
                });
            }
        });

        assert_eq!(winners.load(Ordering::Relaxed), NODES);
        assert!((0..NODES as Node).all(|n| visited.is_claimed(n)));
    });
}

#[test]
fn filter_never_forgets_an_insert_under_contention() {
    GhostToken::new(|token| {
        let filter = CuckooFilter::with_capacity(&token, NODES);
        let inserted: Vec<Vec<Node>> = thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|t| {
                    let filter = &filter;
                    s.spawn(move || {
                        (t..NODES)
                            .step_by(THREADS)
                            .map(|n| n as Node)
                            .filter(|&n| filter.insert(n))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        for node in inserted.into_iter().flatten() {
            assert!(filter.may_contain(node), "lost {node}");
        }
    });
}

#[test]
fn handoff_publishes_claims_made_before_arrival() {
    for policy in HandoffPolicy::ALL {
        GhostToken::new(|token| {
            let visited = VisitedSet::new(&token, NODES);
            let handoff = PhaseHandoff::new(&token, THREADS, policy);
            let per_thread = NODES / THREADS;

            thread::scope(|s| {
                for t in 0..THREADS {
                    let (visited, handoff) = (&visited, &handoff);
                    s.spawn(move || {
                        for round in 0..4 {
                            let quarter = per_thread / 4;
                            let base = t * per_thread + round * quarter;
                            for n in base..base + quarter {
                                assert!(visited.try_claim(n as Node));
                            }
                            handoff.arrive(|| {}).unwrap();
                            // Every claim of this round, by every thread, is visible now.
                            for peer in 0..THREADS {
                                let base = peer * per_thread + round * quarter;
                                assert!((base..base + quarter).all(|n| visited.is_claimed(n as Node)));
                            }
                            handoff.arrive(|| {}).unwrap();
                        }
                    });
                }
            });
        });
    }
}
