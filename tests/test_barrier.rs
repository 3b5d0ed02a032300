/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use pagerank_barrier::utils::ReductionBarrier;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[test]
fn test_reduce_worker_indices() {
    for num_workers in 1..=8 {
        let barrier = ReductionBarrier::new(num_workers);
        assert_eq!(barrier.num_workers(), num_workers);
        let expected = (num_workers * (num_workers - 1) / 2) as f64;
        std::thread::scope(|s| {
            for i in 0..num_workers {
                let barrier = &barrier;
                s.spawn(move || {
                    for _ in 0..10 {
                        assert_eq!(barrier.arrive_and_reduce(i as f64), expected);
                    }
                });
            }
        });
    }
}

#[test]
fn test_many_rounds_with_delays() {
    const NUM_WORKERS: usize = 4;
    const ROUNDS: usize = 1000;
    let barrier = ReductionBarrier::new(NUM_WORKERS);
    let arrived = AtomicUsize::new(0);

    std::thread::scope(|s| {
        for i in 0..NUM_WORKERS {
            let barrier = &barrier;
            let arrived = &arrived;
            s.spawn(move || {
                let mut rng = SmallRng::seed_from_u64(i as u64);
                for round in 0..ROUNDS {
                    if rng.random_bool(0.1) {
                        std::thread::sleep(Duration::from_micros(rng.random_range(0..200)));
                    }
                    arrived.fetch_add(1, Ordering::SeqCst);
                    let sum = barrier.arrive_and_reduce((round + i) as f64);
                    assert_eq!(sum, (NUM_WORKERS * round + 6) as f64);
                    // Nobody can be past the next crossing before everybody
                    // has crossed this one.
                    assert!(arrived.load(Ordering::SeqCst) >= NUM_WORKERS * (round + 1));
                    barrier.arrive_and_wait();
                }
            });
        }
    });

    assert_eq!(arrived.load(Ordering::SeqCst), NUM_WORKERS * ROUNDS);
}

#[test]
fn test_wait_interleaved_with_reduce() {
    let barrier = ReductionBarrier::new(3);
    std::thread::scope(|s| {
        for i in 0..3 {
            let barrier = &barrier;
            s.spawn(move || {
                barrier.arrive_and_wait();
                assert_eq!(barrier.arrive_and_reduce(1.0), 3.0);
                barrier.arrive_and_wait();
                barrier.arrive_and_wait();
                // The accumulator is reset after each crossing
                assert_eq!(barrier.arrive_and_reduce(i as f64 * 0.5), 1.5);
            });
        }
    });
}
