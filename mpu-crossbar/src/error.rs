//! Erros do modelo elétrico

use thiserror::Error;

/// Resultado de operações do crossbar
pub type CrossbarResult<T> = Result<T, CrossbarError>;

/// Erros do modelo elétrico do crossbar
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CrossbarError {
    /// Célula fora da grade 4×4
    #[error("Crossbar cell ({row},{col}) out of bounds for {size}x{size} array")]
    OutOfBounds { row: usize, col: usize, size: usize },

    /// Resistências não positivas ou não finitas
    #[error("Invalid electrical parameters: {0}")]
    InvalidParams(String),

    /// Tensão negativa ou não finita
    #[error("Invalid drive voltage: {0} V")]
    InvalidVoltage(f64),

    /// Política de leitura inválida
    #[error("Invalid readout policy: {0}")]
    InvalidPolicy(String),
}
