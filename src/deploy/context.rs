// ABOUTME: Packages the Dockerfile build context as a tar archive.
// ABOUTME: Uses a configured directory or the built-in Dockerfile template.

use bytes::Bytes;
use std::path::PathBuf;

/// Dockerfile used when no build context directory is configured.
pub const DEFAULT_DOCKERFILE: &str = include_str!("../../templates/Dockerfile");

/// Where the build context comes from.
#[derive(Debug, Clone)]
pub enum BuildContext {
    /// A directory on disk, archived on every build.
    Directory(PathBuf),
    /// The built-in template: a lone Dockerfile.
    Embedded,
}

impl BuildContext {
    pub fn from_config(dir: Option<&PathBuf>) -> Self {
        match dir {
            Some(dir) => BuildContext::Directory(dir.clone()),
            None => BuildContext::Embedded,
        }
    }

    /// Produce the tar archive the engine expects as a build body.
    pub async fn archive(&self) -> std::io::Result<Bytes> {
        let source = self.clone();
        tokio::task::spawn_blocking(move || source.archive_blocking())
            .await
            .map_err(std::io::Error::other)?
    }

    fn archive_blocking(&self) -> std::io::Result<Bytes> {
        let mut builder = tar::Builder::new(Vec::new());

        match self {
            BuildContext::Directory(dir) => {
                if !dir.join("Dockerfile").is_file() {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("no Dockerfile in {}", dir.display()),
                    ));
                }
                builder.follow_symlinks(false);
                builder.append_dir_all(".", dir)?;
            }
            BuildContext::Embedded => {
                let data = DEFAULT_DOCKERFILE.as_bytes();
                let mut header = tar::Header::new_gnu();
                header.set_size(data.len() as u64);
                header.set_mode(0o644);
                header.set_cksum();
                builder.append_data(&mut header, "Dockerfile", data)?;
            }
        }

        Ok(Bytes::from(builder.into_inner()?))
    }
}
