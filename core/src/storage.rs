use std::path::{Path, PathBuf};

use crate::ext::LoggableError;

const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
	#[error("only images can be uploaded, got '{0}'")]
	UnsupportedType(String),

	#[error("upload exceeds {0} bytes")]
	TooLarge(usize),

	#[error("invalid stored filename '{0}'")]
	InvalidName(String),

	#[error("filesystem error: {0}")]
	Io(#[from] std::io::Error),
}

impl StorageError {
	/// whether the client sent something unacceptable, as opposed to a server fault
	pub fn is_rejection(&self) -> bool {
		!matches!(self, StorageError::Io(_))
	}
}

/// Flat directory of uploaded images. Callers only ever handle the generated filenames,
/// turning them into urls is up to whoever serves the directory.
#[derive(Debug, Clone)]
pub struct Storage {
	dir: PathBuf,
	max_bytes: usize,
}

impl Storage {
	pub fn new(dir: impl Into<PathBuf>, max_bytes: usize) -> Self {
		Storage { dir: dir.into(), max_bytes }
	}

	pub fn dir(&self) -> &Path {
		&self.dir
	}

	/// store an upload under a fresh unique name, returning that name
	pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
		let ext = Path::new(original_name)
			.extension()
			.and_then(|x| x.to_str())
			.map(|x| x.to_lowercase())
			.unwrap_or_default();

		if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
			return Err(StorageError::UnsupportedType(original_name.to_string()));
		}

		if bytes.len() > self.max_bytes {
			return Err(StorageError::TooLarge(self.max_bytes));
		}

		tokio::fs::create_dir_all(&self.dir).await?;
		let name = format!("{}-{}.{ext}", chrono::Utc::now().timestamp_millis(), uuid::Uuid::new_v4().simple());
		tokio::fs::write(self.dir.join(&name), bytes).await?;
		tracing::debug!("stored upload '{original_name}' as {name}");
		Ok(name)
	}

	/// remove a stored file, a file already missing is fine
	pub async fn discard(&self, name: &str) -> Result<(), StorageError> {
		// names come from the db or from clients: never let them walk out of the upload dir
		if name.is_empty() || name.contains('/') || name.contains('\\') || name.starts_with('.') {
			return Err(StorageError::InvalidName(name.to_string()));
		}
		match tokio::fs::remove_file(self.dir.join(name)).await {
			Ok(()) => Ok(()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
			Err(e) => Err(e.into()),
		}
	}

	/// best effort cleanup, failures only get logged
	pub async fn discard_all(&self, names: &[String]) {
		for name in names {
			self.discard(name)
				.await
				.warn_failed(&format!("could not remove stored file {name}"));
		}
	}
}
