use std::{
	collections::BTreeMap,
	fs,
	io::ErrorKind,
	path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Cached embedding of one card, valid only while `content_hash` matches the card's current
/// embedding text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorCacheEntry {
	#[serde(rename = "hash")]
	pub content_hash: String,
	pub vector: Vec<f32>,
}
impl VectorCacheEntry {
	pub fn is_valid_for(&self, content_hash: &str) -> bool {
		!self.vector.is_empty() && self.content_hash == content_hash
	}
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorSnapshot {
	#[serde(default)]
	pub version: String,
	#[serde(default)]
	pub updated_at: Option<String>,
	#[serde(default)]
	pub embedding_model: String,
	#[serde(default)]
	pub vectors: BTreeMap<String, VectorCacheEntry>,
}

/// Snapshot file holding every cached card vector. The file is advisory: deleting it only costs a
/// rebuild.
#[derive(Debug, Clone)]
pub struct VectorCacheFile {
	path: PathBuf,
}
impl VectorCacheFile {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Reads the snapshot. A missing file is an empty snapshot, not an error.
	pub fn read(&self) -> Result<VectorSnapshot> {
		let raw = match fs::read_to_string(&self.path) {
			Ok(raw) => raw,
			Err(err) if err.kind() == ErrorKind::NotFound => return Ok(VectorSnapshot::default()),
			Err(err) => return Err(Error::Io { path: self.path.clone(), source: err }),
		};

		serde_json::from_str(&raw)
			.map_err(|err| Error::Decode { path: self.path.clone(), source: err })
	}

	/// Serializes the full snapshot, writes it to a sibling temp file, then renames it over the
	/// target so readers never see a partial file.
	pub fn write(&self, snapshot: &VectorSnapshot) -> Result<()> {
		let raw = serde_json::to_vec_pretty(snapshot).map_err(|err| Error::Encode { source: err })?;

		if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
			fs::create_dir_all(parent)
				.map_err(|err| Error::Io { path: parent.to_path_buf(), source: err })?;
		}

		let tmp = self.temp_path();

		fs::write(&tmp, raw).map_err(|err| Error::Io { path: tmp.clone(), source: err })?;

		if let Err(err) = fs::rename(&tmp, &self.path) {
			let _ = fs::remove_file(&tmp);

			return Err(Error::Io { path: self.path.clone(), source: err });
		}

		Ok(())
	}

	/// Best-effort [`Self::read`]: any failure is logged and yields an empty snapshot.
	pub fn load(&self) -> VectorSnapshot {
		match self.read() {
			Ok(snapshot) => snapshot,
			Err(err) => {
				tracing::warn!(error = %err, "Ignoring unreadable vector cache.");

				VectorSnapshot::default()
			},
		}
	}

	/// Best-effort [`Self::write`]: losing the cache costs performance, not correctness.
	pub fn save(&self, snapshot: &VectorSnapshot) -> bool {
		match self.write(snapshot) {
			Ok(()) => {
				tracing::debug!(
					path = %self.path.display(),
					entries = snapshot.vectors.len(),
					"Vector cache saved."
				);

				true
			},
			Err(err) => {
				tracing::warn!(error = %err, "Failed to save vector cache.");

				false
			},
		}
	}

	fn temp_path(&self) -> PathBuf {
		let mut name = self.path.file_name().map(|name| name.to_os_string()).unwrap_or_default();

		name.push(".tmp");

		self.path.with_file_name(name)
	}
}
