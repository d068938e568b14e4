use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use requests_sdk::FileRef;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::ports::FileStorePort;

struct StoredFile {
    name: String,
    tag: String,
    content: Vec<u8>,
}

/// File store kept in process memory. A file is only visible under the tag
/// it was created with.
#[derive(Default)]
pub struct InMemoryFileStore {
    files: RwLock<HashMap<Uuid, StoredFile>>,
}

impl InMemoryFileStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.read().is_empty()
    }
}

#[async_trait]
impl FileStorePort for InMemoryFileStore {
    async fn create(
        &self,
        name: &str,
        content: Vec<u8>,
        tag: &str,
    ) -> Result<FileRef, DomainError> {
        let id = Uuid::now_v7();
        tracing::debug!(file_id = %id, name, size = content.len(), "file stored");
        self.files.write().insert(
            id,
            StoredFile {
                name: name.to_owned(),
                tag: tag.to_owned(),
                content,
            },
        );
        Ok(FileRef {
            id,
            name: name.to_owned(),
        })
    }

    async fn read(&self, id: Uuid, tag: &str) -> Result<Vec<u8>, DomainError> {
        self.files
            .read()
            .get(&id)
            .filter(|f| f.tag == tag)
            .map(|f| f.content.clone())
            .ok_or(DomainError::FileNotFound { id })
    }

    async fn delete(&self, id: Uuid, tag: &str) -> Result<(), DomainError> {
        let mut files = self.files.write();
        match files.get(&id) {
            Some(file) if file.tag == tag => {
                tracing::debug!(file_id = %id, name = %file.name, "file deleted");
                files.remove(&id);
                Ok(())
            }
            _ => Err(DomainError::FileNotFound { id }),
        }
    }
}
