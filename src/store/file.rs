//! Simple file-backed [`TokenStore`] so the personal service survives restarts.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	store::{StoreError, StoreFuture, TokenStore},
	token::TokenRecord,
};

/// Persists the single token record to a JSON file after each mutation.
///
/// Writes go through a temporary file followed by a rename so a crash mid-write never
/// leaves a truncated record behind.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<Option<TokenRecord>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = if path.exists() { Self::load_snapshot(&path)? } else { None };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<Option<TokenRecord>, StoreError> {
		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(None);
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;
		let record: TokenRecord =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(Some(record))
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(&self, contents: &Option<TokenRecord>) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		match contents {
			Some(record) => {
				let serialized =
					serde_json::to_vec_pretty(record).map_err(|e| StoreError::Serialization {
						message: format!("Failed to serialize token record: {e}"),
					})?;
				let mut tmp_path = self.path.clone();

				tmp_path.set_extension("tmp");

				{
					let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
						message: format!("Failed to create {}: {e}", tmp_path.display()),
					})?;

					file.write_all(&serialized).map_err(|e| StoreError::Backend {
						message: format!("Failed to write {}: {e}", tmp_path.display()),
					})?;
					file.sync_all().map_err(|e| StoreError::Backend {
						message: format!("Failed to sync {}: {e}", tmp_path.display()),
					})?;
				}

				fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
					message: format!("Failed to replace {}: {e}", self.path.display()),
				})
			},
			None =>
				if self.path.exists() {
					fs::remove_file(&self.path).map_err(|e| StoreError::Backend {
						message: format!("Failed to remove {}: {e}", self.path.display()),
					})
				} else {
					Ok(())
				},
		}
	}
}
impl TokenStore for FileStore {
	fn save(&self, record: TokenRecord) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			*guard = Some(record);
			self.persist_locked(&guard)?;

			Ok(())
		})
	}

	fn load_current(&self) -> StoreFuture<'_, Option<TokenRecord>> {
		Box::pin(async move { Ok(self.inner.read().clone()) })
	}

	fn clear(&self) -> StoreFuture<'_, Option<TokenRecord>> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let previous = guard.take();

			self.persist_locked(&guard)?;

			Ok(previous)
		})
	}
}
