//! # 🧮 mpu-logic — Engine de Estado Lógico
//!
//! Grade limitada de células binárias e interpretador de um pequeno
//! conjunto de instruções estilo mMPU (memristive Memory Processing Unit).
//! O replay passo a passo é uma máquina de estados explícita, conduzida
//! por quem a possui (ver `mpu-orchestration`).
//!
//! ## Arquitetura
//!
//! ```text
//! ┌─────────────────────────────────┐
//! │            Replay               │ (Idle → Running → Done)
//! │  ┌───────────────────────────┐  │
//! │  │  Vec<Instruction>         │  │
//! │  │  (INV, NOR, ISO, CMB,     │  │
//! │  │   JMPS, JMPR)             │  │
//! │  └─────────────┬─────────────┘  │
//! │                ▼ execute        │
//! │  ┌───────────────────────────┐  │
//! │  │  LogicGrid                │  │
//! │  │  (rows × cols células +   │  │
//! │  │   histórico por célula)   │  │
//! │  └───────────────────────────┘  │
//! └─────────────────────────────────┘
//! ```
//!
//! ## Exemplo
//!
//! ```
//! use mpu_logic::{Coord, Instruction, LogicGrid};
//!
//! let mut grid = LogicGrid::new(1, 3)?;
//! grid.set_state(Coord::new(0, 0), true)?;
//! grid.execute(&Instruction::nor_write((0, 2), (0, 0), (0, 1)))?;
//! assert!(!grid.get_state(Coord::new(0, 2))?);
//! # Ok::<(), mpu_logic::LogicError>(())
//! ```

pub mod coord;
pub mod error;
pub mod grid;
pub mod instruction;
pub mod replay;

pub use coord::Coord;
pub use error::{LogicError, LogicResult};
pub use grid::{Cell, HistoryEntry, HistoryOp, LogicGrid, MAX_CELLS, Snapshot};
pub use instruction::{Instruction, OpCode};
pub use replay::{Replay, ReplayState, RunHandle, StepOutcome};
