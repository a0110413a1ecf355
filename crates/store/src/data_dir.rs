use std::fs;
use std::path::{Path, PathBuf};

use bookstore_core::StoreError;

/// Directory holding the inventory store, its backup and every per-user cart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataDir {
    root: PathBuf,
}

impl DataDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the directory if it does not exist yet.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|source| StoreError::Io { path: root.clone(), source })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn cart_path(&self, username: &str) -> PathBuf {
        self.root.join(cart_file_name(username))
    }
}

pub fn cart_file_name(username: &str) -> String {
    format!("cart-{username}.csv")
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::{cart_file_name, DataDir};

    #[test]
    fn cart_files_follow_the_user_pattern() {
        assert_eq!(cart_file_name("alice"), "cart-alice.csv");
        assert_eq!(DataDir::new("data").cart_path("bob"), PathBuf::from("data/cart-bob.csv"));
    }

    #[test]
    fn open_creates_missing_directories() {
        let dir = TempDir::new().expect("tempdir");
        let nested = dir.path().join("a").join("b");

        let data_dir = DataDir::open(&nested).expect("open data dir");

        assert!(nested.is_dir());
        assert_eq!(data_dir.path("books.csv"), nested.join("books.csv"));
    }
}
