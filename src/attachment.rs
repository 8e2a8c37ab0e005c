//! The Attachment Fetcher (§4.6): downloads attachment bytes from the blob store by
//! key, preserving `ScheduledEmail::attachments` ordering. `BlobStore` is a trait
//! for the same reason `ModelFetcher` is one in `uri.rs` — it lets the fetcher be
//! exercised without a live S3 bucket.

use std::future::Future;

use crate::domain::AttachmentRef;
use crate::domain::FetchedAttachment;
use crate::errors::AttachmentError;

pub trait BlobStore {
    fn get_object(&self, key: &str) -> impl Future<Output = Result<Vec<u8>, anyhow::Error>> + Send;
}

pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3BlobStore {
    pub fn new(client: aws_sdk_s3::Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

impl BlobStore for S3BlobStore {
    async fn get_object(&self, key: &str) -> Result<Vec<u8>, anyhow::Error> {
        let output = self.client.get_object().bucket(&self.bucket).key(key).send().await?;
        let bytes = output.body.collect().await?.into_bytes();
        Ok(bytes.to_vec())
    }
}

pub struct AttachmentFetcher<S> {
    store: S,
}

impl<S: BlobStore> AttachmentFetcher<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    async fn fetch_one(&self, attachment: &AttachmentRef) -> Result<FetchedAttachment, AttachmentError> {
        let bytes = self.store.get_object(&attachment.blob_key).await.map_err(|source| {
            AttachmentError::Fetch {
                filename: attachment.filename.clone(),
                blob_key: attachment.blob_key.clone(),
                source,
            }
        })?;
        Ok(FetchedAttachment { filename: attachment.filename.clone(), bytes })
    }

    /// Downloads every attachment in order. Sequential rather than concurrent — unlike
    /// `context_entry(list)` (§4.4), ordering here has no concurrent-fan-out requirement
    /// in the spec, so there is nothing to gain from racing the downloads.
    pub async fn fetch_all(&self, attachments: &[AttachmentRef]) -> Result<Vec<FetchedAttachment>, AttachmentError> {
        let mut fetched = Vec::with_capacity(attachments.len());
        for attachment in attachments {
            fetched.push(self.fetch_one(attachment).await?);
        }
        Ok(fetched)
    }
}
