use thiserror::Error;

pub type Result<T> = std::result::Result<T, TestInfraError>;

/// Failures while starting or inspecting a test container.
#[derive(Debug, Error)]
pub enum TestInfraError {
    #[error("container error: {0}")]
    Container(#[from] testcontainers::TestcontainersError),
}
