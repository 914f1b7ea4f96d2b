/*!
Resolving storage locations. Defines the [Bucket] enum for bucket-style urls and the [UrlResolver]
that turns them into directly fetchable https urls.
*/

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub mod store;

/// Default host of virtual-hosted S3 urls
pub const DEFAULT_S3_HOST: &str = "s3.amazonaws.com";
/// Default host of virtual-hosted GCS urls
pub const DEFAULT_GCS_HOST: &str = "storage.googleapis.com";

/// Type for buckets for different cloud providers
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Bucket<'s> {
    /// Aws S3 bucket
    S3(&'s str),
    /// GCS bucket
    GCS(&'s str),
    /// No bucket
    Local,
}

impl Display for Bucket<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bucket::S3(s) => write!(f, "s3://{s}"),
            Bucket::GCS(s) => write!(f, "gs://{s}"),
            Bucket::Local => write!(f, ""),
        }
    }
}

impl<'s> Bucket<'s> {
    /// Get the bucket and the object key from the location string. The key keeps its leading "/".
    /// Locations without a bucket-style scheme return [Bucket::Local] and the unchanged location.
    pub fn from_path(path: &'s str) -> Result<(Bucket<'s>, &'s str), Error> {
        let Some((scheme, rest)) = path.split_once("://") else {
            return Ok((Bucket::Local, path));
        };
        let bucket: fn(&'s str) -> Bucket<'s> = match scheme {
            "s3" | "s3a" | "s3n" => Bucket::S3,
            "gs" | "gcs" => Bucket::GCS,
            _ => return Ok((Bucket::Local, path)),
        };
        let index = rest.find('/').ok_or_else(|| {
            Error::InvalidUrl(
                path.to_owned(),
                "missing path separator after bucket".to_owned(),
            )
        })?;
        let (name, key) = rest.split_at(index);
        if name.is_empty() {
            return Err(Error::InvalidUrl(
                path.to_owned(),
                "empty bucket name".to_owned(),
            ));
        }
        Ok((bucket(name), key))
    }
}

/// Rewrites bucket-style urls (`s3://`, `s3a://`, `gs://`, ...) to virtual-hosted https urls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UrlResolver {
    /// Host appended to S3 bucket names
    pub s3_host: String,
    /// Host appended to GCS bucket names
    pub gcs_host: String,
}

impl Default for UrlResolver {
    fn default() -> Self {
        UrlResolver {
            s3_host: DEFAULT_S3_HOST.to_owned(),
            gcs_host: DEFAULT_GCS_HOST.to_owned(),
        }
    }
}

impl UrlResolver {
    /// Resolve a storage location into a url that can be fetched over https.
    /// Urls without a bucket-style scheme are returned unchanged.
    pub fn resolve(&self, url: &str) -> Result<String, Error> {
        match Bucket::from_path(url)? {
            (Bucket::S3(bucket), key) => Ok(format!("https://{bucket}.{}{key}", self.s3_host)),
            (Bucket::GCS(bucket), key) => Ok(format!("https://{bucket}.{}{key}", self.gcs_host)),
            (Bucket::Local, _) => Ok(url.to_owned()),
        }
    }
}

/// Translate a storage location into an https url using the default hosts.
pub fn translate_url(url: &str) -> Result<String, Error> {
    UrlResolver::default().resolve(url)
}
