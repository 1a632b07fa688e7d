//! # 🔀 mpu-gates — Catálogo de Portas
//!
//! Cada porta associa um nome a uma grade de trabalho, uma célula de saída,
//! uma sequência de instruções baseada em NOR e uma função-verdade de
//! referência. A função-verdade é a única fonte de corretude; a sequência
//! existe para visualização passo a passo.
//!
//! ## Exemplo
//!
//! ```
//! use mpu_gates::{GateCatalog, GateInputs};
//!
//! let catalog = GateCatalog::builtin();
//! let nand = catalog.get("nand")?;
//! assert!(!nand.evaluate(GateInputs::new(true, true)));
//! assert_eq!(nand.instructions(GateInputs::default()).len(), 5);
//! # Ok::<(), mpu_gates::GateError>(())
//! ```

pub mod catalog;
pub mod comparison;
pub mod definition;
pub mod error;

pub use catalog::GateCatalog;
pub use comparison::{ComparisonFigures, ComparisonTable};
pub use definition::{
    GateDefinition, GateInfo, GateInputs, INPUT_A, INPUT_B, InstructionGenerator, TruthFunction,
};
pub use error::{GateError, GateResult};
