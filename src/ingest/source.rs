use std::io;
use std::path::Path;

/// Where worker tasks read file contents from.
#[rocket::async_trait]
pub trait FileSource: Send + Sync + 'static {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// Reads straight from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

#[rocket::async_trait]
impl FileSource for FsSource {
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }
}
