//! HTTP implementation of [`RemoteService`].
//!
//! Every operation is a POST of a tagged [`BackendRequest`] to `<backend>/invoke`.
//! Successful responses carry the JSON payload; failures carry an [`ApiError`].

use anyhow::Result;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{DiskStats, FileInfo, FolderStats, Location, QuickPaths, SystemStats},
    error::ApiError,
    protocol::BackendRequest,
};
use tracing::debug;
use url::Url;

use crate::{error::TransportError, RemoteService};

pub struct HttpRemoteService {
    http: Client,
    invoke_url: Url,
}

impl HttpRemoteService {
    pub fn new(backend_url: &str) -> Result<Self, TransportError> {
        let invalid = |source| TransportError::InvalidUrl {
            url: backend_url.to_string(),
            source,
        };
        let base = if backend_url.ends_with('/') {
            Url::parse(backend_url)
        } else {
            Url::parse(&format!("{backend_url}/"))
        }
        .map_err(invalid)?;
        let invoke_url = base.join("invoke").map_err(invalid)?;

        Ok(Self {
            http: Client::new(),
            invoke_url,
        })
    }

    pub fn invoke_url(&self) -> &Url {
        &self.invoke_url
    }

    async fn send(&self, request: &BackendRequest) -> Result<Response, TransportError> {
        let command = request.name();
        debug!(command, "transport: invoking backend command");
        let response = self
            .http
            .post(self.invoke_url.clone())
            .json(request)
            .send()
            .await
            .map_err(|source| TransportError::Request { command, source })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        match response.json::<ApiError>().await {
            Ok(error) => Err(TransportError::Backend { command, error }),
            Err(_) => Err(TransportError::Status {
                command,
                status: status.as_u16(),
            }),
        }
    }

    async fn invoke<T: DeserializeOwned>(&self, request: BackendRequest) -> Result<T, TransportError> {
        let command = request.name();
        self.send(&request)
            .await?
            .json::<T>()
            .await
            .map_err(|source| TransportError::Request { command, source })
    }

    /// For commands whose success carries no payload; the body is ignored.
    async fn invoke_unit(&self, request: BackendRequest) -> Result<(), TransportError> {
        self.send(&request).await.map(|_| ())
    }
}

#[async_trait]
impl RemoteService for HttpRemoteService {
    async fn get_quick_paths(&self) -> Result<QuickPaths> {
        Ok(self.invoke(BackendRequest::GetQuickPaths).await?)
    }

    async fn read_directory(&self, location: &Location) -> Result<Vec<FileInfo>> {
        Ok(self
            .invoke(BackendRequest::ReadDirectory {
                path: location.clone(),
            })
            .await?)
    }

    async fn get_folder_stats(&self, location: &Location) -> Result<FolderStats> {
        Ok(self
            .invoke(BackendRequest::GetFolderStats {
                path: location.clone(),
            })
            .await?)
    }

    async fn get_disk_stats(&self) -> Result<DiskStats> {
        Ok(self.invoke(BackendRequest::GetDiskStats).await?)
    }

    async fn get_system_stats(&self) -> Result<SystemStats> {
        Ok(self.invoke(BackendRequest::GetSystemStats).await?)
    }

    async fn get_file_preview(&self, location: &Location) -> Result<Vec<u8>> {
        let encoded: String = self
            .invoke(BackendRequest::GetFilePreview {
                path: location.clone(),
            })
            .await?;
        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|source| TransportError::PreviewPayload {
                path: location.to_string(),
                source,
            })?;
        Ok(bytes)
    }

    async fn open_file(&self, location: &Location) -> Result<()> {
        Ok(self
            .invoke_unit(BackendRequest::OpenFile {
                path: location.clone(),
            })
            .await?)
    }

    async fn kill_process(&self, pid: u32) -> Result<()> {
        Ok(self.invoke_unit(BackendRequest::KillProcess { pid }).await?)
    }

    async fn rename_path(&self, from: &Location, to: &Location) -> Result<()> {
        Ok(self
            .invoke_unit(BackendRequest::RenamePath {
                old_path: from.clone(),
                new_path: to.clone(),
            })
            .await?)
    }

    async fn duplicate_path(&self, location: &Location) -> Result<()> {
        Ok(self
            .invoke_unit(BackendRequest::DuplicatePath {
                path: location.clone(),
            })
            .await?)
    }

    async fn delete_path(&self, location: &Location) -> Result<()> {
        Ok(self
            .invoke_unit(BackendRequest::DeletePath {
                path: location.clone(),
            })
            .await?)
    }

    async fn clear_stats_cache(&self) -> Result<()> {
        Ok(self.invoke_unit(BackendRequest::ClearStatsCache).await?)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
