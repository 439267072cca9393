//! File sink behaviour on a real filesystem

use keyturn_credential::prelude::*;
use pretty_assertions::assert_eq;

fn pair(id: &str, secret: &str) -> CredentialPair {
    CredentialPair::new(AccessKeyId::new(id).unwrap(), SecretString::new(secret), "deploy-bot")
}

#[tokio::test]
async fn test_round_trip_preserves_pair() {
    // GIVEN: a file sink in a scratch directory
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("new-aws-access-key.json");
    let sink = FileSink::new(&path);

    // WHEN: a pair is written and read back
    sink.write(&pair("AKIANEWKEY", "wJalrXUtnFEMI/K7MDENG+bPxRfiCY"))
        .await
        .unwrap();
    let read = FileSink::read(&path).await.unwrap();

    // THEN: id, secret and user survive
    assert_eq!(read.id.as_str(), "AKIANEWKEY");
    assert_eq!(read.owner_username, "deploy-bot");
    read.secret
        .expose_secret(|s| assert_eq!(s, "wJalrXUtnFEMI/K7MDENG+bPxRfiCY"));
}

#[tokio::test]
async fn test_file_uses_expected_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("key.json");

    FileSink::new(&path)
        .write(&pair("AKIANEWKEY", "s3cr3t"))
        .await
        .unwrap();

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "aws_access_key_id": "AKIANEWKEY",
            "aws_secret_access_key": "s3cr3t",
            "username": "deploy-bot",
        })
    );
}

#[tokio::test]
async fn test_rewrite_replaces_and_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("key.json");
    let sink = FileSink::new(&path);

    sink.write(&pair("AKIAFIRST", "one")).await.unwrap();
    sink.write(&pair("AKIASECOND", "two")).await.unwrap();

    let read = FileSink::read(&path).await.unwrap();
    assert_eq!(read.id.as_str(), "AKIASECOND");

    let entries: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("key.json")]);
}

#[cfg(unix)]
#[tokio::test]
async fn test_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("key.json");

    FileSink::new(&path)
        .write(&pair("AKIANEWKEY", "s3cr3t"))
        .await
        .unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[tokio::test]
async fn test_read_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("key.json");
    std::fs::write(&path, b"{\"aws_access_key_id\": \"../x\"}").unwrap();

    let err = FileSink::read(&path).await.unwrap_err();
    assert!(matches!(err, SinkError::Serialize(_)));
}
