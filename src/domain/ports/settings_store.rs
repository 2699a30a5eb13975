use async_trait::async_trait;
use crate::domain::{errors::DomainError, Setting};

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_setting(&self, key: &str) -> Result<Option<Setting>, DomainError>;
    async fn put_setting(&self, setting: &Setting) -> Result<(), DomainError>;
}
