pub mod azure_openai;
pub mod deepseek;
pub mod failover;
pub mod gateway;
pub mod registry;
mod wire;

pub use azure_openai::{AzureOpenAiBackend, AzureOpenAiSettings};
pub use deepseek::{DeepSeekBackend, DeepSeekSettings};
pub use failover::FailoverPolicy;
pub use gateway::{ChatBackend, ChatFuture, ProviderError, ProviderErrorKind};
pub use registry::{
    BackendConfigError, ProviderHandle, ProviderKind, ProviderRegistry, ProviderRegistryBuilder,
    RegistryError,
};
