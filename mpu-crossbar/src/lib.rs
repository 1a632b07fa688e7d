//! # ⚡ mpu-crossbar — Modelo Elétrico do Crossbar
//!
//! Modelo de leitura de um crossbar memristivo 4×4: cada célula tem um
//! nível de resistência (LRS/HRS) e um seletor. Dado um conjunto de
//! word-lines acionadas e uma tensão, calcula correntes por célula, total
//! por bit-line (incluindo sneak-paths) e um bit derivado por limiar.
//!
//! É uma aproximação linear de resistores (sem capacitância, drift ou
//! ruído), não um solver de rede.
//!
//! ## Arquitetura
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       CROSSBAR 4×4                          │
//! │   DriveConfig            Crossbar               Readout     │
//! │  ┌──────────┐     ┌────────────────────┐    ┌────────────┐  │
//! │  │ WL0 ← A  │────▶│ G = 1/R_low|1/R_high│───▶│ I_col0 >   │  │
//! │  │ WL1 ← B  │     │ (0 se seletor off) │    │ 0.35·V/R_lo│  │
//! │  │ WL2, WL3 │     └─────────┬──────────┘    └────────────┘  │
//! │  └──────────┘               ▼                               │
//! │                  Currents (per_cell, column_totals)         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Uso
//!
//! ```
//! use mpu_crossbar::{Crossbar, DriveConfig, ReadoutPolicy, ResistanceLevel};
//!
//! let mut xbar = Crossbar::default();
//! xbar.set_cell_resistance(0, 0, ResistanceLevel::Low)?;
//!
//! let drive = DriveConfig::from_inputs(true, false, 1.0)?;
//! let result = xbar.simulate(&drive, &ReadoutPolicy::default());
//! assert!(result.output);
//! # Ok::<(), mpu_crossbar::CrossbarError>(())
//! ```

pub mod cell;
pub mod crossbar;
pub mod drive;
pub mod error;
pub mod readout;

pub use cell::{CrossbarCell, ElectricalParams, ResistanceLevel};
pub use crossbar::{Crossbar, Currents, SimulationResult};
pub use drive::DriveConfig;
pub use error::{CrossbarError, CrossbarResult};
pub use readout::ReadoutPolicy;

/// Constantes de referência do modelo
pub mod constants {
    /// Dimensão fixa do crossbar (linhas = colunas)
    pub const CROSSBAR_SIZE: usize = 4;

    /// Resistência do estado de baixa resistência (LRS), Ω
    pub const R_LOW_OHMS: f64 = 1.0e3;

    /// Resistência do estado de alta resistência (HRS), Ω
    pub const R_HIGH_OHMS: f64 = 1.0e5;

    /// Tensão de leitura padrão, V
    pub const DEFAULT_DRIVE_VOLTS: f64 = 1.0;

    /// Fração de `V / R_low` acima da qual a coluna lê 1
    pub const READOUT_FRACTION: f64 = 0.35;

    /// Bit-line usada na leitura
    pub const REFERENCE_COLUMN: usize = 0;
}
