//! Input validation limits for resource protection

/// Maximum length for node and relationship type names (128 chars)
pub const MAX_TYPE_NAME_LEN: usize = 128;

/// Maximum traversal and path search depth (50)
pub const MAX_TRAVERSAL_DEPTH: u32 = 50;

/// Maximum nodes in a single traversal result (10000)
pub const MAX_TRAVERSAL_NODES: usize = 10000;

/// Validation error type
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    EmptyTypeName,
    TypeNameTooLong { len: usize, max: usize },
    TraversalDepthTooLarge { depth: u32, max: u32 },
    TraversalLimitTooLarge { limit: usize, max: usize },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTypeName => write!(f, "Type name cannot be empty"),
            Self::TypeNameTooLong { len, max } => {
                write!(f, "Type name too long: {} chars (max {})", len, max)
            }
            Self::TraversalDepthTooLarge { depth, max } => {
                write!(f, "Traversal depth too large: {} (max {})", depth, max)
            }
            Self::TraversalLimitTooLarge { limit, max } => {
                write!(f, "Traversal limit too large: {} (max {})", limit, max)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a node or relationship type name
pub fn validate_type_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyTypeName);
    }
    if name.len() > MAX_TYPE_NAME_LEN {
        return Err(ValidationError::TypeNameTooLong {
            len: name.len(),
            max: MAX_TYPE_NAME_LEN,
        });
    }
    Ok(())
}

/// Validate traversal depth
pub fn validate_traversal_depth(depth: u32) -> Result<(), ValidationError> {
    if depth > MAX_TRAVERSAL_DEPTH {
        return Err(ValidationError::TraversalDepthTooLarge {
            depth,
            max: MAX_TRAVERSAL_DEPTH,
        });
    }
    Ok(())
}

/// Validate traversal result limit
pub fn validate_traversal_limit(limit: usize) -> Result<(), ValidationError> {
    if limit > MAX_TRAVERSAL_NODES {
        return Err(ValidationError::TraversalLimitTooLarge {
            limit,
            max: MAX_TRAVERSAL_NODES,
        });
    }
    Ok(())
}
