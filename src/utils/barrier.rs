/*
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::sync::{Condvar, Mutex};

/// A cyclic barrier that sums a value contributed by each worker.
///
/// A barrier for `n` workers releases its waiters when the `n`-th worker
/// arrives, and it is then ready for the next round: there is no need to build
/// a new barrier for each synchronization point of an iterative computation.
///
/// Besides the plain [`arrive_and_wait`](Self::arrive_and_wait), the barrier
/// provides [`arrive_and_reduce`](Self::arrive_and_reduce), which adds the
/// value passed by each worker to an accumulator and returns the total to all
/// of them. A global sum thus costs a single crossing instead of a crossing
/// to publish partial results followed by a crossing to read them.
///
/// All workers must call the synchronization methods the same number of times
/// and in the same order: a worker that skips a crossing (for example,
/// because it panicked) leaves the other workers blocked forever.
///
/// # Examples
///
/// ```
/// use pagerank_barrier::utils::ReductionBarrier;
///
/// let barrier = ReductionBarrier::new(4);
/// std::thread::scope(|s| {
///     for i in 0..4 {
///         let barrier = &barrier;
///         s.spawn(move || {
///             assert_eq!(barrier.arrive_and_reduce(i as f64), 6.0);
///             barrier.arrive_and_wait();
///             assert_eq!(barrier.arrive_and_reduce(1.0), 4.0);
///         });
///     }
/// });
/// ```
#[derive(Debug)]
pub struct ReductionBarrier {
    num_workers: usize,
    state: Mutex<State>,
    cvar: Condvar,
}

#[derive(Debug)]
struct State {
    /// Workers that have not arrived yet in the current generation.
    pending: usize,
    /// Flipped by the last worker of each generation.
    generation: bool,
    /// The sum of the contributions of the current generation.
    accumulator: f64,
    /// The sum of the contributions of the last completed generation.
    result: f64,
}

impl ReductionBarrier {
    /// Creates a barrier for `num_workers` workers.
    ///
    /// # Panics
    ///
    /// Panics if `num_workers` is zero.
    pub fn new(num_workers: usize) -> Self {
        assert_ne!(num_workers, 0, "A barrier needs at least one worker");
        Self {
            num_workers,
            state: Mutex::new(State {
                pending: num_workers,
                generation: false,
                accumulator: 0.0,
                result: 0.0,
            }),
            cvar: Condvar::new(),
        }
    }

    /// Returns the number of workers the barrier waits for.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Blocks until all workers have called this method.
    pub fn arrive_and_wait(&self) {
        self.arrive(0.0);
    }

    /// Blocks until all workers have called this method, and returns the sum
    /// of the values passed by all of them.
    ///
    /// All workers receive the same value; the accumulator is then reset for
    /// the next round.
    pub fn arrive_and_reduce(&self, value: f64) -> f64 {
        self.arrive(value)
    }

    fn arrive(&self, value: f64) -> f64 {
        let mut state = self.state.lock().unwrap();
        let generation = state.generation;
        state.accumulator += value;
        state.pending -= 1;

        if state.pending == 0 {
            state.result = state.accumulator;
            state.accumulator = 0.0;
            state.pending = self.num_workers;
            state.generation = !generation;
            self.cvar.notify_all();
            state.result
        } else {
            // The result cannot be overwritten before we read it, as the next
            // generation cannot complete without us.
            let state = self
                .cvar
                .wait_while(state, |state| state.generation == generation)
                .unwrap();
            state.result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_worker() {
        let barrier = ReductionBarrier::new(1);
        barrier.arrive_and_wait();
        assert_eq!(barrier.arrive_and_reduce(2.5), 2.5);
        assert_eq!(barrier.arrive_and_reduce(1.0), 1.0);
        barrier.arrive_and_wait();
        assert_eq!(barrier.arrive_and_reduce(0.5), 0.5);
    }

    #[test]
    #[should_panic]
    fn test_no_workers() {
        ReductionBarrier::new(0);
    }

    #[test]
    fn test_two_workers() {
        let barrier = ReductionBarrier::new(2);
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..2)
                .map(|i| {
                    let barrier = &barrier;
                    s.spawn(move || {
                        let mut sums = vec![];
                        for round in 0..100 {
                            sums.push(barrier.arrive_and_reduce((round * 2 + i) as f64));
                            barrier.arrive_and_wait();
                        }
                        sums
                    })
                })
                .collect();
            for handle in handles {
                let sums = handle.join().unwrap();
                for (round, sum) in sums.into_iter().enumerate() {
                    assert_eq!(sum, (round * 4 + 1) as f64);
                }
            }
        });
    }
}
