pub mod extract;

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

use crate::errors::AppError;

/// S3-backed blob store for raw document bytes, addressed by opaque key.
#[derive(Clone)]
pub struct BlobStore {
    client: S3Client,
    bucket: String,
}

/// Bytes fetched back from the blob store, with the media type recorded at
/// upload time.
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub media_type: Option<String>,
}

impl BlobStore {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    pub async fn put(&self, key: &str, bytes: Vec<u8>, media_type: &str) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(media_type)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("blob store put failed: {e}")))?;
        Ok(())
    }

    pub async fn get(&self, key: &str) -> Result<StoredObject, AppError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("blob store get failed: {e}")))?;

        let media_type = output.content_type().map(str::to_string);
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| AppError::Upstream(format!("blob store read failed: {e}")))?
            .into_bytes()
            .to_vec();

        Ok(StoredObject { bytes, media_type })
    }
}
