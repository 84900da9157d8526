pub mod artifacts;
pub mod client;
pub mod config;
pub mod contracts;
pub mod deployer;
pub mod deployments;
pub mod error;
pub mod scripts;
pub mod verify;

#[cfg(test)]
mod tests;

#[cfg(test)]
pub(crate) mod test_utils {
    use std::{
        env, fs,
        path::{Path, PathBuf},
    };

    /// Fresh directory under the system temp dir.
    pub fn scratch_dir(prefix: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("{prefix}-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    pub fn write_json(path: &Path, value: serde_json::Value) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, serde_json::to_string_pretty(&value).unwrap()).unwrap();
    }
}
