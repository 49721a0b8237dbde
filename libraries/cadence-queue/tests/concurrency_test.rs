//! Concurrency tests
//!
//! A player thread advancing, a command thread editing and readers taking
//! snapshots all share one queue.

mod test_helpers;

use cadence_queue::{PlaybackStatus, Queue, QueueConfig, RepeatMode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use test_helpers::*;

#[test]
fn test_player_and_commands_share_queue() {
    init_logging();
    let queue = Arc::new(Queue::new());
    queue.add(create_album("base", 10)).unwrap();
    queue.set_repeat_mode(RepeatMode::All);

    let player = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            for _ in 0..500 {
                // the queue never empties, so repeat-all always finds a next track
                queue.iterate().unwrap();
            }
        })
    };

    let commands = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            for i in 0..100 {
                let added = queue.insert_next(create_album(&format!("c{}_", i), 3)).unwrap();
                assert_eq!(added, 3);
                if i % 3 == 0 {
                    queue.set_shuffle(i % 2 == 0).unwrap();
                }
                let size = queue.size();
                queue.remove(size - 2, size).unwrap();
            }
        })
    };

    let reader = {
        let queue = Arc::clone(&queue);
        thread::spawn(move || {
            let config = QueueConfig::default();
            for _ in 0..200 {
                let snapshot = queue.snapshot(&PlaybackStatus::default(), &config).unwrap();
                assert!(snapshot.position.is_some_and(|pos| pos < snapshot.size));
                assert!(snapshot.next.len() <= config.lookaround);
            }
        })
    };

    player.join().unwrap();
    commands.join().unwrap();
    reader.join().unwrap();

    assert_eq!(queue.size(), 110);
    assert_eq!(queue.get_tracks().unwrap().len(), 110);
    assert!(queue.position().is_some_and(|pos| pos < 110));
}

#[test]
fn test_write_transaction_is_atomic_for_readers() {
    let queue = Arc::new(Queue::new());
    queue.add(create_album("a", 4)).unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let reader = {
        let queue = Arc::clone(&queue);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let mut observed = 0;
            loop {
                {
                    let state = queue.read();
                    // clear and refill happen under one write lock
                    assert_eq!(state.size(), 4);
                    assert!(state.current().is_ok());
                }
                observed += 1;
                if done.load(Ordering::SeqCst) {
                    return observed;
                }
            }
        })
    };

    for i in 0..200 {
        let mut state = queue.write();
        state.clear(false).unwrap();
        state.add(create_album(&format!("r{}_", i), 4)).unwrap();
    }
    done.store(true, Ordering::SeqCst);

    assert!(reader.join().unwrap() > 0);
    assert_eq!(current_id(&queue), "r199_0");
}

#[test]
fn test_parallel_appends_are_all_kept() {
    let queue = Arc::new(Queue::with_max_size(Some(1000)).unwrap());

    let writers: Vec<_> = (0..8)
        .map(|t| {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                for i in 0..20 {
                    queue.add(create_album(&format!("t{}_{}_", t, i), 5)).unwrap();
                }
            })
        })
        .collect();

    for writer in writers {
        writer.join().unwrap();
    }

    assert_eq!(queue.size(), 800);
    let tracks = queue_ids(&queue);
    let mut unique = tracks.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), 800);
    assert_eq!(queue.position(), Some(0));

    // each album stays contiguous
    for chunk in tracks.chunks(5) {
        let prefix = chunk[0].trim_end_matches('0');
        assert!(chunk.iter().all(|id| id.starts_with(prefix)));
    }
}
