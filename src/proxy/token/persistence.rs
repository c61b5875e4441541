use crate::error::{AppError, AppResult};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Newline-delimited bearer tokens, one account per line.
///
/// The file is the only state that survives a restart. Rewrites go through a
/// single async lock and land via temp file + rename, so a concurrent reader
/// never observes a half-written store.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
    tokens: Mutex<Vec<String>>,
}

fn parse_token_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "tokens".to_string());
    path.with_file_name(format!(".{}.tmp", file_name))
}

impl TokenStore {
    /// Reads the store. A missing or unreadable file is fatal to the run.
    pub async fn load(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AppError::TokenStore(format!("token file {:?} not found", path))
            } else {
                AppError::TokenStore(format!("failed to read token file {:?}: {}", path, e))
            }
        })?;
        let tokens = parse_token_lines(&content);
        tracing::info!("[TokenStore] Loaded {} token(s) from {:?}", tokens.len(), path);

        Ok(Self {
            path,
            tokens: Mutex::new(tokens),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn snapshot(&self) -> Vec<String> {
        self.tokens.lock().await.clone()
    }

    /// Swaps every occurrence of `old` for `new`, keeping line order, and
    /// returns how many lines of the file changed.
    ///
    /// The file is re-read under the lock so lines the operator added or
    /// edited since startup survive the rewrite. The in-memory snapshot only
    /// ever sees the swap itself: accounts added to the file mid-run are not
    /// picked up until the next process start.
    pub async fn replace(&self, old: &str, new: &str) -> AppResult<usize> {
        let mut tokens = self.tokens.lock().await;
        let on_disk = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => parse_token_lines(&content),
            Err(e) => {
                tracing::warn!(
                    "[TokenStore] Failed to re-read {:?} before rewrite ({}), using in-memory copy",
                    self.path,
                    e
                );
                tokens.clone()
            }
        };
        swap_token(&mut tokens, old, new);

        let mut updated = on_disk;
        let replaced = swap_token(&mut updated, old, new);
        if replaced == 0 {
            tracing::warn!("[TokenStore] Token to replace is no longer present in {:?}", self.path);
            return Ok(0);
        }

        let mut content = updated.join("\n");
        content.push('\n');
        let temp_path = temp_path_for(&self.path);
        tokio::fs::write(&temp_path, content).await?;
        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(AppError::TokenStore(format!(
                "failed to replace token file {:?}: {}",
                self.path, e
            )));
        }

        tracing::debug!("[TokenStore] Replaced {} line(s) in {:?}", replaced, self.path);
        Ok(replaced)
    }
}

fn swap_token(lines: &mut [String], old: &str, new: &str) -> usize {
    let mut replaced = 0;
    for line in lines.iter_mut().filter(|line| line.as_str() == old) {
        *line = new.to_string();
        replaced += 1;
    }
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::temp_path;

    async fn store_with(content: &str) -> (TokenStore, PathBuf) {
        let path = temp_path("tokens");
        tokio::fs::write(&path, content).await.expect("write tokens");
        let store = TokenStore::load(&path).await.expect("load tokens");
        (store, path)
    }

    #[tokio::test]
    async fn load_skips_blank_lines_and_trims() {
        let (store, path) = store_with("  A  \n\n\nB\n   \nC").await;
        assert_eq!(store.snapshot().await, vec!["A", "B", "C"]);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn missing_file_is_a_token_store_error() {
        let err = TokenStore::load(temp_path("absent")).await.expect_err("missing file");
        assert!(matches!(err, AppError::TokenStore(_)));
    }

    #[tokio::test]
    async fn replace_keeps_order_and_other_lines() {
        let (store, path) = store_with("A\nC\nD\n").await;
        let replaced = store.replace("A", "B").await.expect("replace");

        assert_eq!(replaced, 1);
        assert_eq!(store.snapshot().await, vec!["B", "C", "D"]);
        assert_eq!(std::fs::read_to_string(&path).expect("read back"), "B\nC\nD\n");
        assert!(!temp_path_for(&path).exists());
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn replace_of_unknown_token_leaves_file_untouched() {
        let (store, path) = store_with("A\nC\n").await;
        assert_eq!(store.replace("Z", "B").await.expect("replace"), 0);
        assert_eq!(std::fs::read_to_string(&path).expect("read back"), "A\nC\n");
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn lines_added_mid_run_reach_the_file_but_not_the_snapshot() {
        let (store, path) = store_with("A\nB\n").await;
        tokio::fs::write(&path, "A\nB\nC\n").await.expect("operator edit");

        assert_eq!(store.replace("A", "A2").await.expect("replace"), 1);
        assert_eq!(std::fs::read_to_string(&path).expect("read back"), "A2\nB\nC\n");
        assert_eq!(store.snapshot().await, vec!["A2", "B"]);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn snapshot_follows_the_swap_even_if_the_file_lost_the_line() {
        let (store, path) = store_with("A\nB\n").await;
        tokio::fs::write(&path, "B\n").await.expect("operator edit");

        assert_eq!(store.replace("A", "A2").await.expect("replace"), 0);
        assert_eq!(std::fs::read_to_string(&path).expect("read back"), "B\n");
        assert_eq!(store.snapshot().await, vec!["A2", "B"]);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn concurrent_replacements_do_not_lose_updates() {
        let (store, path) = store_with("A\nB\nC\nD\n").await;
        let store = std::sync::Arc::new(store);

        let handles: Vec<_> = [("A", "A2"), ("B", "B2"), ("C", "C2"), ("D", "D2")]
            .into_iter()
            .map(|(old, new)| {
                let store = store.clone();
                tokio::spawn(async move { store.replace(old, new).await })
            })
            .collect();
        for handle in handles {
            handle.await.expect("join").expect("replace");
        }

        assert_eq!(
            std::fs::read_to_string(&path).expect("read back"),
            "A2\nB2\nC2\nD2\n"
        );
        let _ = std::fs::remove_file(path);
    }
}
