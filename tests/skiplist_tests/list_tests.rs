//! SkipList Tests
//!
//! Tests verify:
//! - Basic insert/search/delete operations
//! - Overwrite semantics (count and level preserved)
//! - Level structure invariants after mixed workloads
//! - Ordered, restartable iteration
//! - Clear functionality
//! - Concurrent access patterns

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skipkv::{InsertOutcome, LevelGenerator, SkipList};

// =============================================================================
// Basic Operations Tests
// =============================================================================

#[test]
fn test_new_list_is_empty() {
    let list: SkipList<i32, String> = SkipList::new();
    assert_eq!(list.len(), 0);
    assert!(list.is_empty());
    assert_eq!(list.level(), 0);
    assert_eq!(list.max_level(), 32);
    assert_eq!(list.iter().count(), 0);
    list.check_invariants().unwrap();
}

#[test]
fn test_insert_and_search() {
    let list = SkipList::new();

    assert_eq!(list.insert(1, "one".to_string()), InsertOutcome::Inserted);

    assert_eq!(list.search(&1), Some("one".to_string()));
    assert!(list.contains_key(&1));
    assert_eq!(list.len(), 1);
}

#[test]
fn test_search_nonexistent_key() {
    let list = SkipList::new();
    list.insert(5, "five");

    assert_eq!(list.search(&4), None);
    assert_eq!(list.search(&6), None);
    assert!(!list.contains_key(&0));
}

#[test]
fn test_search_with_borrowed_key() {
    let list: SkipList<String, u32> = SkipList::new();
    list.insert("apple".to_string(), 1);
    list.insert("banana".to_string(), 2);

    assert_eq!(list.search("banana"), Some(2));
    assert!(list.delete("apple"));
    assert_eq!(list.search("apple"), None);
}

#[test]
fn test_insert_overwrites_existing() {
    let list = SkipList::new();

    assert_eq!(list.insert(7, "study"), InsertOutcome::Inserted);
    let level = list.level_of(&7).unwrap();

    assert_eq!(list.insert(7, "play"), InsertOutcome::Updated);

    assert_eq!(list.len(), 1);
    assert_eq!(list.search(&7), Some("play"));
    assert_eq!(list.level_of(&7), Some(level));
}

#[test]
fn test_overwrite_never_changes_levels() {
    let list = SkipList::new();
    for i in 0..500 {
        list.insert(i, i);
    }
    let levels: Vec<_> = (0..500).map(|i| list.level_of(&i).unwrap()).collect();

    for i in 0..500 {
        assert_eq!(list.insert(i, i * 10), InsertOutcome::Updated);
    }

    assert_eq!(list.len(), 500);
    for i in 0..500 {
        assert_eq!(list.level_of(&i), Some(levels[i as usize]));
        assert_eq!(list.search(&i), Some(i * 10));
    }
    list.check_invariants().unwrap();
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_existing_key() {
    let list = SkipList::new();
    list.insert(1, "good");
    list.insert(3, "good");
    list.insert(7, "study");

    assert!(list.delete(&3));

    assert_eq!(list.search(&3), None);
    assert_eq!(list.len(), 2);
    assert_eq!(list.search(&1), Some("good"));
    assert_eq!(list.search(&7), Some("study"));
    list.check_invariants().unwrap();
}

#[test]
fn test_delete_nonexistent_key() {
    let list = SkipList::new();
    list.insert(1, "a");
    list.insert(3, "c");
    let before: Vec<_> = list.iter().collect();
    let level = list.level();

    assert!(!list.delete(&2));
    assert!(!list.delete(&0));
    assert!(!list.delete(&99));

    assert_eq!(list.len(), 2);
    assert_eq!(list.level(), level);
    assert_eq!(list.iter().collect::<Vec<_>>(), before);
    list.check_invariants().unwrap();
}

#[test]
fn test_delete_is_idempotent() {
    let list = SkipList::new();
    list.insert(42, ());

    assert!(list.delete(&42));
    assert!(!list.delete(&42));
    assert!(list.is_empty());
    assert_eq!(list.level(), 0);
}

#[test]
fn test_insert_after_delete() {
    let list = SkipList::new();
    list.insert(1, "first");
    list.delete(&1);

    assert_eq!(list.insert(1, "second"), InsertOutcome::Inserted);
    assert_eq!(list.search(&1), Some("second"));
    assert_eq!(list.len(), 1);
}

#[test]
fn test_delete_all_resets_level() {
    let list = SkipList::new();
    for i in 0..200 {
        list.insert(i, ());
    }
    assert!(list.level() > 0);

    for i in 0..200 {
        assert!(list.delete(&i));
    }

    assert!(list.is_empty());
    assert_eq!(list.level(), 0);
    list.check_invariants().unwrap();
}

// =============================================================================
// Iteration Tests
// =============================================================================

#[test]
fn test_iter_sorted_order() {
    let list = SkipList::new();
    for key in [29, 8, 1, 19, 3, 9, 7] {
        list.insert(key, key.to_string());
    }

    let keys: Vec<_> = list.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec![1, 3, 7, 8, 9, 19, 29]);
}

#[test]
fn test_iter_is_restartable() {
    let list = SkipList::new();
    list.insert("b", 2);
    list.insert("a", 1);

    let first: Vec<_> = list.iter().collect();
    let second: Vec<_> = list.iter().collect();

    assert_eq!(first, vec![("a", 1), ("b", 2)]);
    assert_eq!(first, second);
}

#[test]
fn test_iter_exact_size() {
    let list = SkipList::new();
    for i in 0..10 {
        list.insert(i, i);
    }

    let mut iter = list.iter();
    assert_eq!(iter.len(), 10);
    iter.next();
    iter.next();
    assert_eq!(iter.len(), 8);
}

// =============================================================================
// Clear Tests
// =============================================================================

#[test]
fn test_clear() {
    let list = SkipList::new();
    for i in 0..100 {
        list.insert(i, i);
    }

    list.clear();

    assert!(list.is_empty());
    assert_eq!(list.level(), 0);
    assert_eq!(list.search(&50), None);
    assert_eq!(list.iter().count(), 0);
    list.check_invariants().unwrap();
}

#[test]
fn test_reuse_after_clear() {
    let list = SkipList::new();
    list.insert(1, "a");
    list.clear();

    list.insert(2, "b");
    assert_eq!(list.len(), 1);
    assert_eq!(list.search(&2), Some("b"));
    list.check_invariants().unwrap();
}

// =============================================================================
// Structural Invariant Tests
// =============================================================================

#[test]
fn test_randomized_ops_match_btreemap() {
    let list = SkipList::new();
    let mut model = BTreeMap::new();
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for step in 0..5_000 {
        let key: u16 = rng.gen_range(0..512);
        if rng.gen_bool(0.6) {
            let expected = if model.insert(key, step).is_some() {
                InsertOutcome::Updated
            } else {
                InsertOutcome::Inserted
            };
            assert_eq!(list.insert(key, step), expected);
        } else {
            assert_eq!(list.delete(&key), model.remove(&key).is_some());
        }

        if step % 500 == 0 {
            list.check_invariants().unwrap();
        }
    }

    list.check_invariants().unwrap();
    assert_eq!(list.len(), model.len());
    assert_eq!(list.iter().collect::<Vec<_>>(), model.into_iter().collect::<Vec<_>>());
}

#[test]
fn test_found_keys_equal_inserted_minus_deleted() {
    let list = SkipList::new();
    for i in 0..300u32 {
        list.insert(i, ());
    }
    for i in (0..300u32).filter(|i| i % 3 == 0) {
        assert!(list.delete(&i));
    }

    for i in 0..300u32 {
        assert_eq!(list.contains_key(&i), i % 3 != 0, "key {}", i);
    }
    assert_eq!(list.len(), 200);
}

#[test]
fn test_level_zero_generator_builds_linked_list() {
    let list = SkipList::with_level_generator(LevelGenerator::new(0, 0.5).unwrap());
    for i in (0..50).rev() {
        list.insert(i, i);
    }

    assert_eq!(list.level(), 0);
    assert_eq!(list.max_level(), 0);
    assert_eq!(list.iter().map(|(k, _)| k).collect::<Vec<_>>(), (0..50).collect::<Vec<_>>());
    list.check_invariants().unwrap();
}

#[test]
fn test_levels_never_exceed_max() {
    let list = SkipList::with_level_generator(LevelGenerator::new(3, 0.9).unwrap());
    for i in 0..1_000 {
        list.insert(i, ());
    }

    assert!(list.level() <= 3);
    assert!((0..1_000).all(|i| list.level_of(&i).unwrap() <= 3));
    list.check_invariants().unwrap();
}

// =============================================================================
// Concurrent Access Tests
// =============================================================================

#[test]
fn test_concurrent_reads() {
    let list = Arc::new(SkipList::new());
    for i in 0..100 {
        list.insert(i, format!("value{}", i));
    }

    let mut handles = vec![];

    for _ in 0..8 {
        let list = Arc::clone(&list);
        let handle = thread::spawn(move || {
            for i in 0..100 {
                assert_eq!(list.search(&i), Some(format!("value{}", i)));
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }
    list.check_invariants().unwrap();
}

#[test]
fn test_concurrent_writes() {
    let list = Arc::new(SkipList::new());

    let mut handles = vec![];

    for t in 0..8 {
        let list = Arc::clone(&list);
        let handle = thread::spawn(move || {
            for j in 0..250 {
                list.insert(t * 1_000 + j, t);
            }
        });
        handles.push(handle);
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(list.len(), 2_000);
    list.check_invariants().unwrap();
}

#[test]
fn test_concurrent_mixed_readers_and_writers() {
    let list = Arc::new(SkipList::new());
    for i in 0..1_000u32 {
        list.insert(i, i);
    }

    let mut handles = vec![];

    // Writers delete odd keys and overwrite even ones
    for t in 0..2u32 {
        let list = Arc::clone(&list);
        handles.push(thread::spawn(move || {
            for i in (t..1_000).step_by(2) {
                if i % 2 == 1 {
                    list.delete(&i);
                } else {
                    list.insert(i, i + 1);
                }
            }
        }));
    }

    // Readers only ever see sorted snapshots with values from either epoch
    for _ in 0..4 {
        let list = Arc::clone(&list);
        handles.push(thread::spawn(move || {
            for _ in 0..20 {
                let entries: Vec<_> = list.iter().collect();
                assert!(entries.windows(2).all(|w| w[0].0 < w[1].0));
                assert!(entries.iter().all(|&(k, v)| v == k || v == k + 1));
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(list.len(), 500);
    for i in 0..1_000u32 {
        let expected = if i % 2 == 0 { Some(i + 1) } else { None };
        assert_eq!(list.search(&i), expected);
    }
    list.check_invariants().unwrap();
}

#[test]
fn test_reads_under_iterator_with_queued_writer() {
    let list = Arc::new(SkipList::new());
    for i in 0..100u32 {
        list.insert(i, i);
    }

    let mut iter = list.iter();
    assert_eq!(iter.next(), Some((0, 0)));

    let writer = {
        let list = Arc::clone(&list);
        thread::spawn(move || {
            list.insert(1_000, 1_000);
        })
    };
    // Give the writer time to queue behind the iterator's read lock
    thread::sleep(Duration::from_millis(50));

    assert_eq!(list.search(&50), Some(50));
    assert_eq!(list.len(), 100);
    assert_eq!(list.iter().count(), 100);
    assert_eq!(iter.count(), 99);

    writer.join().unwrap();
    assert_eq!(list.search(&1_000), Some(1_000));
}
