use std::sync::Arc;
use std::time::Duration;

use crate::memory::{Fixed, MemoryStore, Unreachable};
use crate::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::TRACE)
        .try_init();
}

// ===== Per-operation behaviour =====

#[tokio::test]
async fn test_bitmap64_operations() {
    init_tracing();
    let store = Arc::new(MemoryStore::new());
    let bm = Bitmap64::new("users", Arc::clone(&store));

    assert!(bm.is_empty().await.unwrap());
    assert_eq!(bm.len().await.unwrap(), 0);

    bm.add(0).await.unwrap();
    bm.add(u64::from(u32::MAX)).await.unwrap();
    bm.add(1 << 32).await.unwrap();
    bm.add(1 << 32).await.unwrap();

    assert_eq!(bm.len().await.unwrap(), 3);
    assert!(bm.contains(1 << 32).await.unwrap());
    assert!(!bm.contains(1).await.unwrap());
    assert!(!bm.is_empty().await.unwrap());

    bm.remove(1 << 32).await.unwrap();
    bm.remove(12345).await.unwrap();
    assert_eq!(bm.len().await.unwrap(), 2);

    bm.clear().await.unwrap();
    assert!(bm.is_empty().await.unwrap());
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn test_bitmap32_operations() {
    let store = Arc::new(MemoryStore::new());
    let bm = Bitmap32::new("flags", Arc::clone(&store));

    bm.add(1 << 20).await.unwrap();
    bm.add(7).await.unwrap();
    assert!(bm.contains(1 << 20).await.unwrap());
    assert!(!bm.contains(u32::MAX).await.unwrap());
    assert_eq!(bm.len().await.unwrap(), 2);
    assert_eq!(store.strlen("{flags}"), (1 << 17) + 1);

    bm.remove(7).await.unwrap();
    bm.remove(7).await.unwrap();
    assert_eq!(bm.len().await.unwrap(), 1);

    // Bit 0 is the most significant bit of the first byte.
    let first = Bitmap32::new("first", Arc::clone(&store));
    first.add(0).await.unwrap();
    first.add(9).await.unwrap();
    assert_eq!(store.strlen("{first}"), 2);
    assert!(!first.contains(8).await.unwrap());
    assert!(first.contains(9).await.unwrap());
}

#[tokio::test]
async fn test_bitmap32_remove_on_missing_key_creates_nothing() {
    let store = Arc::new(MemoryStore::new());
    let bm = Bitmap32::new("ghost", Arc::clone(&store));

    bm.remove(u32::MAX).await.unwrap();
    bm.remove(0).await.unwrap();
    assert!(bm.is_empty().await.unwrap());
    assert_eq!(bm.len().await.unwrap(), 0);
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn test_bitmap32_remove_past_the_end_keeps_the_key_size() {
    let store = Arc::new(MemoryStore::new());
    let bm = Bitmap32::new("small", Arc::clone(&store));

    bm.add(3).await.unwrap();
    assert_eq!(store.strlen("{small}"), 1);

    bm.remove(8).await.unwrap();
    bm.remove(u32::MAX).await.unwrap();
    assert_eq!(store.strlen("{small}"), 1);
    assert_eq!(bm.len().await.unwrap(), 1);

    // Inside the string the bit is cleared and the key stays.
    bm.remove(3).await.unwrap();
    assert_eq!(store.strlen("{small}"), 1);
    assert!(bm.is_empty().await.unwrap());
    assert!(bm.clear().await.is_ok());
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn test_bitmap64_last_remove_deletes_the_key() {
    let store = Arc::new(MemoryStore::new());
    let bm = Bitmap64::new("once", Arc::clone(&store));

    bm.add(1 << 40).await.unwrap();
    assert_eq!(store.keys(), vec!["{once}"]);
    bm.remove(1 << 40).await.unwrap();
    assert!(store.keys().is_empty());
    assert_eq!(store.strlen("{once}"), 0);
}

#[tokio::test]
async fn test_remove_on_missing_bitmap_is_a_no_op() {
    let store = Arc::new(MemoryStore::new());
    let bm = Bitmap64::new("ghost", Arc::clone(&store));

    bm.remove(1).await.unwrap();
    assert!(bm.is_empty().await.unwrap());
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn test_one_round_trip_per_call() {
    let store = Arc::new(MemoryStore::new());
    let bm = Bitmap64::new("calls", Arc::clone(&store));

    bm.add(1).await.unwrap();
    bm.contains(1).await.unwrap();
    bm.len().await.unwrap();
    bm.is_empty().await.unwrap();
    bm.remove(1).await.unwrap();
    bm.clear().await.unwrap();
    assert_eq!(store.calls(), 6);
}

// ===== Naming =====

#[tokio::test]
async fn test_names_map_to_hash_tagged_keys() {
    let store = Arc::new(MemoryStore::new());
    let a = Bitmap64::new("a", Arc::clone(&store));
    let b = Bitmap64::new("b", Arc::clone(&store));
    assert_eq!(a.name(), "a");
    assert_eq!(a.key(), "{a}");

    a.add(1).await.unwrap();
    b.add(2).await.unwrap();
    assert!(!a.contains(2).await.unwrap());
    assert_eq!(store.keys(), vec!["{a}", "{b}"]);
}

#[tokio::test]
async fn test_same_name_is_same_bitmap() {
    let store = Arc::new(MemoryStore::new());
    let writer = Bitmap64::new("shared", Arc::clone(&store));
    let reader = Bitmap64::new("shared", Arc::clone(&store));

    writer.add(99).await.unwrap();
    assert!(reader.contains(99).await.unwrap());
}

// ===== Concurrency =====

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_are_not_lost() {
    let store = Arc::new(MemoryStore::new());
    let bm = Arc::new(Bitmap64::new("hot", Arc::clone(&store)));

    let tasks: Vec<_> = (0..64u64)
        .map(|i| {
            let bm = Arc::clone(&bm);
            tokio::spawn(async move { bm.add(i << 32 | i).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(bm.len().await.unwrap(), 64);
    for i in 0..64u64 {
        assert!(bm.contains(i << 32 | i).await.unwrap());
    }
}

// ===== Failures =====

#[tokio::test]
async fn test_transport_errors_propagate() {
    init_tracing();
    let bm = Bitmap64::new("down", Unreachable);

    let err = bm.add(1).await.unwrap_err();
    match err {
        RemoteError::Redis(ref e) => assert_eq!(e.kind(), redis::ErrorKind::IoError),
        other => panic!("unexpected error: {other}"),
    }
    assert!(bm.len().await.is_err());
}

#[tokio::test]
async fn test_unexpected_replies() {
    let bm = Bitmap32::new("odd", Fixed(-1));
    assert!(matches!(
        bm.len().await,
        Err(RemoteError::UnexpectedReply { op: Operation::Len, reply: -1 })
    ));
    assert!(matches!(
        bm.contains(3).await,
        Err(RemoteError::UnexpectedReply { op: Operation::Contains, .. })
    ));
}

#[tokio::test]
async fn test_timeout() {
    let store = Arc::new(MemoryStore::with_latency(Duration::from_millis(200)));
    let bm = Bitmap64::new("slow", Arc::clone(&store)).with_timeout(Duration::from_millis(10));

    let err = bm.add(1).await.unwrap_err();
    assert!(matches!(err, RemoteError::Timeout(t) if t == Duration::from_millis(10)));

    let patient = Bitmap64::new("slow", Arc::clone(&store)).with_timeout(Duration::from_secs(5));
    patient.add(2).await.unwrap();
    assert!(patient.contains(2).await.unwrap());
}

// ===== Live server =====

#[tokio::test]
#[ignore = "requires a Redis server at REDIS_URL"]
async fn test_live_redis() {
    init_tracing();
    let config = RedisConfig {
        url: std::env::var("REDIS_URL").unwrap_or_else(|_| RedisConfig::default().url),
        timeout: Some(Duration::from_secs(5)),
    };
    let client = RedisScriptClient::connect(&config).await.unwrap();

    let bm64 = Bitmap64::new("bitmap-redis-live-64", client.clone()).with_timeout(config.timeout);
    bm64.clear().await.unwrap();
    bm64.add(1 << 40).await.unwrap();
    bm64.add(3).await.unwrap();
    assert!(bm64.contains(1 << 40).await.unwrap());
    assert_eq!(bm64.len().await.unwrap(), 2);
    bm64.clear().await.unwrap();
    assert!(bm64.is_empty().await.unwrap());

    let bm32 = Bitmap32::new("bitmap-redis-live-32", client).with_timeout(config.timeout);
    bm32.clear().await.unwrap();
    bm32.add(1000).await.unwrap();
    bm32.remove(1000).await.unwrap();
    assert!(bm32.is_empty().await.unwrap());
    assert_eq!(bm32.len().await.unwrap(), 0);
    bm32.clear().await.unwrap();
}
