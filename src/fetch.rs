//! fetch.rs
//! Conditional GET with ETag/Last-Modified revalidation. `Ok(None)` means
//! the source has not changed and the current snapshot stays.

use anyhow::Result;
use bytes::Bytes;
use reqwest::{Client, StatusCode};

#[derive(Default, Clone)]
pub struct CacheCtl {
    pub etag: Option<String>,
    pub last_mod: Option<String>,
}

pub async fn get_with_cache(
    client: &Client,
    url: &str,
    cache: &mut CacheCtl,
) -> Result<Option<Bytes>> {
    let mut req = client.get(url);
    if let Some(et) = &cache.etag {
        req = req.header("If-None-Match", et);
    }
    if let Some(lm) = &cache.last_mod {
        req = req.header("If-Modified-Since", lm);
    }
    let resp = req.send().await?;
    match resp.status() {
        StatusCode::NOT_MODIFIED => Ok(None),
        StatusCode::OK => {
            cache.etag = resp
                .headers()
                .get("etag")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            cache.last_mod = resp
                .headers()
                .get("last-modified")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            Ok(Some(resp.bytes().await?))
        }
        s => anyhow::bail!("HTTP {} from {}", s, url),
    }
}
