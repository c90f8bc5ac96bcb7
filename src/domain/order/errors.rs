use super::value_objects::OrderStatus;

// ============================================================================
// Order Business Rule Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order items cannot be empty")]
    EmptyItems,

    #[error("Invalid item quantity: {0}")]
    InvalidQuantity(i64),

    #[error("Order total exceeds the representable amount")]
    TotalOverflow,

    #[error("Product id cannot be empty")]
    EmptyProductId,

    #[error("Invalid status: {0}")]
    UnknownStatus(String),

    #[error("Invalid status code: {0}")]
    UnknownStatusCode(i32),

    #[error("Cannot move order from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },
}

// ============================================================================
// Collaborator Errors
// ============================================================================

/// Failure of the order store.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Order already exists: {0}")]
    Conflict(String),

    #[error("Storage operation timed out")]
    Timeout,

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

/// Failure of a remote collaborator (catalog, payment service, broker).
#[derive(Debug, thiserror::Error)]
pub enum IntegrationError {
    #[error("Collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("Collaborator rejected request with status {status}")]
    Rejected { status: u16 },

    #[error("Product not found in catalog: {0}")]
    ProductNotFound(String),

    #[error("Invalid collaborator response: {0}")]
    InvalidResponse(String),

    #[error("Circuit breaker open for {0}")]
    CircuitOpen(String),

    #[error("Collaborator call timed out")]
    Timeout,
}

impl IntegrationError {
    /// Client errors other than 408 and 429 are final.
    pub fn is_transient(&self) -> bool {
        match self {
            IntegrationError::ProductNotFound(_) => false,
            IntegrationError::Rejected { status } => {
                !(400..500).contains(status) || *status == 408 || *status == 429
            }
            _ => true,
        }
    }
}

// ============================================================================
// Service Errors
// ============================================================================

/// Coarse classification used by the inbound boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Upstream,
    Persistence,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] OrderError),

    #[error("Catalog resolution failed: {0}")]
    Catalog(#[source] IntegrationError),

    #[error("Payment hand-off failed: {0}")]
    Payment(#[source] IntegrationError),

    #[error("Event publish failed: {0}")]
    Publish(#[source] IntegrationError),

    #[error("Persistence failed: {0}")]
    Repository(#[source] RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => ServiceError::NotFound(id),
            other => ServiceError::Repository(other),
        }
    }
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::NotFound(_) => ErrorKind::NotFound,
            ServiceError::Validation(_) => ErrorKind::Validation,
            ServiceError::Catalog(_) | ServiceError::Payment(_) | ServiceError::Publish(_) => {
                ErrorKind::Upstream
            }
            ServiceError::Repository(_) => ErrorKind::Persistence,
        }
    }

    /// Whether running the same operation again may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ServiceError::NotFound(_) | ServiceError::Validation(_) => false,
            ServiceError::Catalog(e) | ServiceError::Payment(e) | ServiceError::Publish(e) => {
                e.is_transient()
            }
            ServiceError::Repository(RepositoryError::Conflict(_)) => false,
            ServiceError::Repository(_) => true,
        }
    }
}
