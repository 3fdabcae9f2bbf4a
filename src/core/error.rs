use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Population/matrix size mismatch: {agents} agents, {rows}x{cols} matrix")]
    MatrixShape {
        agents: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Connection matrix is not symmetric at ({i},{j})")]
    AsymmetricMatrix { i: usize, j: usize },

    #[error("Connection weight out of range at ({i},{j}): {weight}")]
    WeightOutOfRange { i: usize, j: usize, weight: f64 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
