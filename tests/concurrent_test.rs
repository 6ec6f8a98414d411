// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 The Fitrank Authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Concurrency tests for the points engine.
//!
//! These verify that concurrent awards never lose updates, that writers for
//! different users do not interfere, and that the locking patterns do not
//! deadlock. Deadlocks are caught with parking_lot's built-in detector
//! (`deadlock_detection` feature).

use fitrank::{LeaderboardPeriod, PointSource, PointsEngine, UserId};
use parking_lot::deadlock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

// === Deadlock Detection Infrastructure ===

/// Starts a background thread that checks for deadlocks.
/// Returns a handle to stop the detector.
fn start_deadlock_detector() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();

    thread::spawn(move || {
        while running_clone.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(100));
            let deadlocks = deadlock::check_deadlock();
            if !deadlocks.is_empty() {
                eprintln!("\n=== DEADLOCK DETECTED ===");
                for (i, threads) in deadlocks.iter().enumerate() {
                    eprintln!("\nDeadlock #{}", i + 1);
                    for t in threads {
                        eprintln!("Thread ID: {:?}", t.thread_id());
                        eprintln!("Backtrace:\n{:#?}", t.backtrace());
                    }
                }
                panic!("Deadlock detected! See output above for details.");
            }
        }
    });

    running
}

/// Stops the deadlock detector.
fn stop_deadlock_detector(running: Arc<AtomicBool>) {
    running.store(false, Ordering::SeqCst);
    thread::sleep(Duration::from_millis(150)); // Let detector thread exit
}

// === Tests ===

/// 100 concurrent +1 awards for one user must land exactly once each.
#[test]
fn concurrent_awards_same_user_are_exact() {
    let detector = start_deadlock_detector();
    let engine = Arc::new(PointsEngine::new());
    let user = engine.register_user("Ada", "Lovelace", None);

    const NUM_THREADS: usize = 100;

    let mut handles = Vec::with_capacity(NUM_THREADS);
    for _ in 0..NUM_THREADS {
        let engine = engine.clone();
        handles.push(thread::spawn(move || {
            engine
                .record_points(user, 1, PointSource::PostLiked)
                .unwrap();
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    stop_deadlock_detector(detector);

    assert_eq!(
        engine.get_profile(&user).unwrap().total_points(),
        NUM_THREADS as i64
    );
    assert_eq!(engine.ledger().entries_for(user).len(), NUM_THREADS);
}

/// Interleaved +1/−1 pairs must cancel exactly.
#[test]
fn concurrent_award_reversal_pairs_cancel() {
    let detector = start_deadlock_detector();
    let engine = Arc::new(PointsEngine::new());
    let user = engine.register_user("Ada", "Lovelace", None);

    // A base balance keeps the clamp out of play so the sum is exact.
    engine
        .record_points(user, 1_000, PointSource::CommentOnPost)
        .unwrap();

    const NUM_PAIRS: usize = 50;

    let mut handles = Vec::with_capacity(NUM_PAIRS * 2);
    for _ in 0..NUM_PAIRS {
        for delta in [1i64, -1] {
            let engine = engine.clone();
            handles.push(thread::spawn(move || {
                engine
                    .record_points(user, delta, PointSource::PostLiked)
                    .unwrap();
            }));
        }
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    stop_deadlock_detector(detector);

    assert_eq!(engine.get_profile(&user).unwrap().total_points(), 1_000);
    assert_eq!(engine.ledger().len(), NUM_PAIRS * 2 + 1);
}

/// Writers for different users proceed independently and land exactly.
#[test]
fn concurrent_awards_different_users_are_independent() {
    let detector = start_deadlock_detector();
    let engine = Arc::new(PointsEngine::new());

    const NUM_USERS: usize = 10;
    const AWARDS_PER_USER: usize = 100;

    let users: Vec<UserId> = (0..NUM_USERS)
        .map(|i| engine.register_user(format!("User{i}"), "Test", None))
        .collect();

    let mut handles = Vec::with_capacity(NUM_USERS);
    for &user in &users {
        let engine = engine.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..AWARDS_PER_USER {
                engine
                    .record_points(user, 1, PointSource::CommentOnPost)
                    .unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    stop_deadlock_detector(detector);

    for user in users {
        assert_eq!(
            engine.get_profile(&user).unwrap().total_points(),
            AWARDS_PER_USER as i64
        );
    }
    assert_eq!(engine.ledger().len(), NUM_USERS * AWARDS_PER_USER);
}

/// The clamp keeps the balance at zero under a storm of negative deltas.
#[test]
fn concurrent_negative_awards_never_go_below_zero() {
    let detector = start_deadlock_detector();
    let engine = Arc::new(PointsEngine::new());
    let user = engine.register_user("Ada", "Lovelace", None);

    engine
        .record_points(user, 10, PointSource::CommentOnPost)
        .unwrap();

    const NUM_THREADS: usize = 50;

    let mut handles = Vec::with_capacity(NUM_THREADS);
    for _ in 0..NUM_THREADS {
        let engine = engine.clone();
        handles.push(thread::spawn(move || {
            engine
                .record_points(user, -1, PointSource::PostLiked)
                .unwrap();
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    stop_deadlock_detector(detector);

    assert_eq!(engine.get_profile(&user).unwrap().total_points(), 0);
    assert_eq!(engine.ledger().len(), NUM_THREADS + 1);
}

/// Leaderboard reads during a write storm neither deadlock nor observe
/// inconsistent rows.
#[test]
fn leaderboard_reads_during_writes() {
    let detector = start_deadlock_detector();
    let engine = Arc::new(PointsEngine::new());
    let running = Arc::new(AtomicBool::new(true));

    const NUM_USERS: usize = 20;
    let users: Vec<UserId> = (0..NUM_USERS)
        .map(|i| engine.register_user(format!("User{i}"), "Test", None))
        .collect();

    let mut handles = Vec::new();

    // Writers: steady stream of awards across all users.
    for writer in 0..4 {
        let engine = engine.clone();
        let users = users.clone();
        let running = running.clone();
        handles.push(thread::spawn(move || {
            let mut i = writer;
            while running.load(Ordering::SeqCst) {
                let user = users[i % users.len()];
                engine
                    .record_points(user, 1, PointSource::PostLiked)
                    .unwrap();
                i += 1;
                thread::yield_now();
            }
        }));
    }

    // Readers: leaderboard and overview snapshots.
    for _ in 0..4 {
        let engine = engine.clone();
        let users = users.clone();
        let running = running.clone();
        handles.push(thread::spawn(move || {
            let mut iterations = 0;
            while running.load(Ordering::SeqCst) && iterations < 200 {
                let board = engine.leaderboard(LeaderboardPeriod::Last30Days, NUM_USERS);
                for (index, row) in board.users.iter().enumerate() {
                    assert_eq!(row.rank, index + 1);
                    assert!(row.total_points >= 0);
                }
                let _ = engine.user_overview(users[iterations % users.len()]);
                iterations += 1;
                thread::yield_now();
            }
        }));
    }

    thread::sleep(Duration::from_millis(500));
    running.store(false, Ordering::SeqCst);

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    stop_deadlock_detector(detector);

    // Every profile's cached balance matches its ledger sum once quiescent.
    for user in users {
        let total = engine.get_profile(&user).unwrap().total_points();
        let ledger_sum: i64 = engine
            .ledger()
            .entries_for(user)
            .iter()
            .map(|e| e.delta)
            .sum();
        assert_eq!(total, ledger_sum);
    }
}

/// Awards racing profile removal either land or fail cleanly, with the
/// ledger and balance in lockstep for survivors.
#[test]
fn awards_racing_user_removal_fail_cleanly() {
    let detector = start_deadlock_detector();
    let engine = Arc::new(PointsEngine::new());
    let user = engine.register_user("Ada", "Lovelace", None);

    const NUM_THREADS: usize = 20;

    let mut handles = Vec::with_capacity(NUM_THREADS + 1);
    for _ in 0..NUM_THREADS {
        let engine = engine.clone();
        handles.push(thread::spawn(move || {
            let _ = engine.record_points(user, 1, PointSource::PostLiked);
        }));
    }

    {
        let engine = engine.clone();
        handles.push(thread::spawn(move || {
            thread::sleep(Duration::from_micros(50));
            let _ = engine.remove_user(user);
        }));
    }

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    stop_deadlock_detector(detector);

    // The profile is gone; however many awards won the race, each left
    // exactly one entry.
    assert!(engine.get_profile(&user).is_none());
    assert!(engine.ledger().entries_for(user).len() <= NUM_THREADS);
}
