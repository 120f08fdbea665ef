use async_trait::async_trait;
use models::ExpenseRecord;
use std::path::{Path, PathBuf};

use crate::error::{ApiError, Result};

/// Repository trait for listing a user's expense records.
/// This abstraction stands in for the upstream document store's
/// query-by-owner call and allows swapping in other backends.
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// All records owned by `user_id`, unordered. A user with nothing stored
    /// yields an empty list, not an error.
    async fn fetch_for_user(&self, user_id: &str) -> Result<Vec<ExpenseRecord>>;
}

/// Checks that a user id is safe to use as a storage key. Ids that are empty,
/// dot-prefixed, or carry anything beyond `[A-Za-z0-9._-]` are rejected, so a
/// path built from an accepted id cannot escape its directory.
pub fn validate_user_id(user_id: &str) -> Result<()> {
    let safe = !user_id.is_empty()
        && !user_id.starts_with('.')
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !safe {
        return Err(ApiError::InvalidUserId(user_id.to_string()));
    }
    Ok(())
}

/// File-based implementation that keeps one JSON array per user under a data
/// directory (`<data_dir>/<user_id>.json`).
pub struct FileExpenseRepository {
    data_dir: PathBuf,
}

impl FileExpenseRepository {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// Maps a user id to its backing file. Ids that could escape the data
    /// directory are rejected before touching the filesystem.
    fn user_file(&self, user_id: &str) -> Result<PathBuf> {
        validate_user_id(user_id)?;
        Ok(self.data_dir.join(format!("{user_id}.json")))
    }
}

#[async_trait]
impl ExpenseRepository for FileExpenseRepository {
    async fn fetch_for_user(&self, user_id: &str) -> Result<Vec<ExpenseRecord>> {
        let path = self.user_file(user_id)?;
        if !path.exists() {
            // No stored expenses yet.
            return Ok(Vec::new());
        }
        let content = tokio::fs::read_to_string(&path).await?;
        let records: Vec<ExpenseRecord> = serde_json::from_str(&content)?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_user_id_rejects_traversal_attempts() {
        assert!(validate_user_id("../etc/passwd").is_err());
        assert!(validate_user_id("a/b").is_err());
        assert!(validate_user_id(".hidden").is_err());
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id("user-1_ok.2").is_ok());
    }

    #[test]
    fn user_file_applies_id_validation() {
        let repo = FileExpenseRepository::new("data");
        assert!(repo.user_file("../etc/passwd").is_err());
        assert!(repo.user_file("user-1").is_ok());
    }

    #[tokio::test]
    async fn missing_user_file_reads_as_empty() {
        let repo = FileExpenseRepository::new(std::env::temp_dir().join("no-such-dir"));
        let records = repo.fetch_for_user("nobody").await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn corrupt_user_file_is_an_error() {
        let dir = std::env::temp_dir().join("expense-repo-test");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("broken.json"), "{ not json").await.unwrap();

        let repo = FileExpenseRepository::new(&dir);
        assert!(repo.fetch_for_user("broken").await.is_err());
    }
}
