//! Erros da engine lógica

use thiserror::Error;

pub type LogicResult<T> = Result<T, LogicError>;

/// Erros da grade lógica e do interpretador
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LogicError {
    /// Coordenada fora dos limites declarados
    #[error("Coordinate ({row},{col}) out of bounds for {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Dimensões inválidas (zero linhas ou colunas)
    #[error("Invalid grid dimensions: {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    /// Mnemônico desconhecido
    #[error("Unknown opcode: {0}")]
    UnknownOpcode(String),

    /// Número de operandos incompatível com o opcode
    #[error("{opcode} expects {expected} operands, found {found}")]
    OperandCount {
        opcode: &'static str,
        expected: usize,
        found: usize,
    },

    /// Texto de instrução mal formado
    #[error("Malformed instruction: {0}")]
    MalformedInstruction(String),

    /// Transição inválida da máquina de replay
    #[error("Invalid replay transition: {0}")]
    InvalidTransition(String),
}
