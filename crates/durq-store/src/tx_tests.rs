use super::*;
use crate::{Store, StoreOptions};
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> Store {
    Store::open(dir.path().join("tx.db"), &StoreOptions::default()).unwrap()
}

#[test]
fn test_put_get_delete() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    store
        .update(|tx| {
            let ns = tx.create_namespace_if_absent(b"data")?;
            ns.put(b"k1", b"v1")?;
            ns.put(b"k2", b"v2")?;
            ns.put(b"k1", b"v1-overwritten")?;
            Ok::<_, StoreError>(())
        })
        .unwrap();

    store
        .view(|tx| {
            let ns = tx.namespace(b"data")?.unwrap();
            assert_eq!(ns.get(b"k1")?, Some(b"v1-overwritten".to_vec()));
            assert_eq!(ns.get(b"missing")?, None);
            assert_eq!(ns.count()?, 2);
            Ok::<_, StoreError>(())
        })
        .unwrap();

    let removed = store
        .update(|tx| {
            let ns = tx.namespace(b"data")?.unwrap();
            Ok::<_, StoreError>((ns.delete(b"k1")?, ns.delete(b"k1")?))
        })
        .unwrap();
    assert_eq!(removed, (true, false));
}

#[test]
fn test_missing_namespace() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    let found = store
        .view(|tx| Ok::<_, StoreError>(tx.namespace(b"nope")?.is_some()))
        .unwrap();
    assert!(!found);
}

#[test]
fn test_namespaces_in_byte_order() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    store
        .update(|tx| {
            for name in [[200u8], [5u8], [0u8], [17u8]] {
                tx.create_namespace_if_absent(&name)?;
            }
            Ok::<_, StoreError>(())
        })
        .unwrap();

    let names = store.view(|tx| tx.namespace_names()).unwrap();
    assert_eq!(names, vec![vec![0u8], vec![5], vec![17], vec![200]]);
}

#[test]
fn test_for_each_stops_on_break() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    store
        .update(|tx| {
            for name in [[1u8], [2u8], [3u8]] {
                tx.create_namespace_if_absent(&name)?;
            }
            Ok::<_, StoreError>(())
        })
        .unwrap();

    let mut visited = Vec::new();
    store
        .view(|tx| {
            tx.for_each(|name, _| {
                visited.push(name.to_vec());
                if name == [2u8] {
                    Ok(ControlFlow::Break(()))
                } else {
                    Ok(ControlFlow::Continue(()))
                }
            })
        })
        .unwrap();
    assert_eq!(visited, vec![vec![1u8], vec![2]]);
}

#[test]
fn test_cursor_walks_in_key_order() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    store
        .update(|tx| {
            let ns = tx.create_namespace_if_absent(b"q")?;
            for key in [3u64, 1, 2] {
                ns.put(&key.to_be_bytes(), format!("v{}", key).as_bytes())?;
            }
            Ok::<_, StoreError>(())
        })
        .unwrap();

    store
        .view(|tx| {
            let ns = tx.namespace(b"q")?.unwrap();
            let mut cursor = ns.cursor();

            let mut keys = Vec::new();
            let mut entry = cursor.first()?;
            while let Some((key, _)) = entry {
                keys.push(key);
                entry = cursor.next()?;
            }
            assert_eq!(
                keys,
                vec![1u64.to_be_bytes().to_vec(), 2u64.to_be_bytes().to_vec(), 3u64.to_be_bytes().to_vec()]
            );
            // Exhausted cursors stay exhausted.
            assert!(cursor.next()?.is_none());

            let (last_key, last_value) = cursor.last()?.unwrap();
            assert_eq!(last_key, 3u64.to_be_bytes().to_vec());
            assert_eq!(last_value, b"v3".to_vec());
            Ok::<_, StoreError>(())
        })
        .unwrap();
}

#[test]
fn test_cursor_delete() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    store
        .update(|tx| {
            let ns = tx.create_namespace_if_absent(b"q")?;
            ns.put(b"a", b"1")?;
            ns.put(b"b", b"2")?;

            let mut cursor = ns.cursor();
            assert!(!cursor.delete()?);
            assert_eq!(cursor.first()?, Some((b"a".to_vec(), b"1".to_vec())));
            assert!(cursor.delete()?);
            assert_eq!(cursor.next()?, Some((b"b".to_vec(), b"2".to_vec())));
            Ok::<_, StoreError>(())
        })
        .unwrap();

    let count = store
        .view(|tx| tx.namespace(b"q")?.unwrap().count())
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_view_rejects_writes() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);

    store
        .update(|tx| tx.create_namespace_if_absent(b"q").map(|_| ()))
        .unwrap();

    let result = store.view(|tx| tx.create_namespace_if_absent(b"other").map(|_| ()));
    assert!(matches!(result, Err(StoreError::ReadOnly)));

    let result = store.view(|tx| tx.namespace(b"q")?.unwrap().put(b"k", b"v"));
    assert!(matches!(result, Err(StoreError::ReadOnly)));
}
