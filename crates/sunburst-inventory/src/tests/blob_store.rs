use super::*;
use crate::blob_store::BlobStore;
use crate::InventoryError;

#[test]
fn paths_follow_documented_layout() -> Result<()> {
    let temp = tempdir()?;
    let store = BlobStore::open(temp.path());
    let blob = hello_blob();

    let path = store.path_of(&blob.hash);
    let expected = temp
        .path()
        .join("blob")
        .join("SHA2_256")
        .join("2D")
        .join(format!("{}.b", &HELLO_HASH[2..]));
    assert_eq!(path, expected);
    Ok(())
}

#[test]
fn write_verifies_and_commits() -> Result<()> {
    let temp = tempdir()?;
    let store = BlobStore::open(temp.path());
    let blob = hello_blob();

    let created = store.write(&blob, &mut &HELLO_BYTES[..])?;
    assert!(created);

    let path = store.path_of(&blob.hash);
    let bytes = std::fs::read(&path)?;
    assert_eq!(bytes, HELLO_BYTES);
    assert_eq!(
        Hash::of_bytes(HashAlgorithm::Sha2_256, &bytes),
        blob.hash,
        "committed bytes must hash to the declared value"
    );

    let rewritten = store.write(&blob, &mut &HELLO_BYTES[..])?;
    assert!(!rewritten, "second write of the same hash is not a creation");
    Ok(())
}

#[test]
fn truncated_upload_leaves_nothing() -> Result<()> {
    let temp = tempdir()?;
    let store = BlobStore::open(temp.path());
    let blob = hello_blob();

    let err = store.write(&blob, &mut &HELLO_BYTES[..2]).unwrap_err();
    assert_eq!(err.code().as_str(), "error-hash-mismatch");
    assert!(matches!(err, InventoryError::HashMismatch { .. }));

    let committed = store.path_of(&blob.hash);
    assert!(!committed.exists(), "no .b file after a broken upload");
    let transient = committed.with_extension("t");
    assert!(!transient.exists(), "no .t file survives an upload");
    Ok(())
}

#[test]
fn wrong_declared_size_is_rejected() -> Result<()> {
    let temp = tempdir()?;
    let store = BlobStore::open(temp.path());
    let mut blob = hello_blob();
    blob.size = 7;

    let err = store.write(&blob, &mut &HELLO_BYTES[..]).unwrap_err();
    assert!(matches!(
        err,
        InventoryError::SizeMismatch {
            expected: 7,
            received: 6
        }
    ));
    assert!(!store.path_of(&blob.hash).exists());
    Ok(())
}

#[test]
fn delete_tolerates_absence() -> Result<()> {
    let temp = tempdir()?;
    let store = BlobStore::open(temp.path());
    let blob = hello_blob();

    store.delete(&blob.hash)?;

    store.write(&blob, &mut &HELLO_BYTES[..])?;
    store.delete(&blob.hash)?;
    assert!(!store.path_of(&blob.hash).exists());
    Ok(())
}
