use std::fmt;

#[derive(Debug)]
pub enum NetError {
    /// Input assignment attempted on a layer that is not the input layer
    NotInputLayer,
    /// A vector or delta matrix does not match the layer shape it targets
    SizeMismatch { expected: usize, got: usize },
    /// The operation is not defined for this cost variant
    NotImplemented(&'static str),
    InvalidCfg(String),
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NetError::NotInputLayer => {
                write!(f, "layer is not an input layer")
            }
            NetError::SizeMismatch { expected, got } => {
                write!(f, "size mismatch: expected {}, got {}", expected, got)
            }
            NetError::NotImplemented(what) => {
                write!(f, "not implemented: {}", what)
            }
            NetError::InvalidCfg(reason) => {
                write!(f, "invalid configuration: {}", reason)
            }
        }
    }
}

impl std::error::Error for NetError {}
