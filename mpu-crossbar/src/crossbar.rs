//! Crossbar 4×4 e cálculo de correntes
//!
//! Aproximação linear: cada célula vê `V_row − 0` (bit-lines aterradas),
//! `I = V × G`, e a corrente de cada bit-line é a soma de todas as linhas.
//! A soma inclui células não endereçadas, que é exatamente a corrente de
//! sneak-path que o modelo quer expor.

use crate::cell::{CrossbarCell, ElectricalParams, ResistanceLevel};
use crate::constants::CROSSBAR_SIZE;
use crate::drive::DriveConfig;
use crate::error::{CrossbarError, CrossbarResult};
use crate::readout::ReadoutPolicy;
use serde::{Deserialize, Serialize};

/// Matriz de células do crossbar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crossbar {
    cells: [[CrossbarCell; CROSSBAR_SIZE]; CROSSBAR_SIZE],
    params: ElectricalParams,
}

impl Crossbar {
    /// Cria crossbar com todas as células em HRS e seletores habilitados
    pub fn new(params: ElectricalParams) -> CrossbarResult<Self> {
        params.validate()?;
        Ok(Self {
            cells: [[CrossbarCell::default(); CROSSBAR_SIZE]; CROSSBAR_SIZE],
            params,
        })
    }

    /// Retorna lado do crossbar
    pub fn size(&self) -> usize {
        CROSSBAR_SIZE
    }

    /// Retorna parâmetros elétricos
    pub fn params(&self) -> &ElectricalParams {
        &self.params
    }

    /// Troca os parâmetros elétricos (validados)
    pub fn set_params(&mut self, params: ElectricalParams) -> CrossbarResult<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    /// Retorna matriz de células
    pub fn cells(&self) -> &[[CrossbarCell; CROSSBAR_SIZE]; CROSSBAR_SIZE] {
        &self.cells
    }

    fn check(&self, row: usize, col: usize) -> CrossbarResult<()> {
        if row < CROSSBAR_SIZE && col < CROSSBAR_SIZE {
            Ok(())
        } else {
            Err(CrossbarError::OutOfBounds {
                row,
                col,
                size: CROSSBAR_SIZE,
            })
        }
    }

    /// Obtém célula
    pub fn cell(&self, row: usize, col: usize) -> CrossbarResult<&CrossbarCell> {
        self.check(row, col)?;
        Ok(&self.cells[row][col])
    }

    fn cell_mut(&mut self, row: usize, col: usize) -> CrossbarResult<&mut CrossbarCell> {
        self.check(row, col)?;
        Ok(&mut self.cells[row][col])
    }

    /// Define nível de resistência de uma célula
    pub fn set_cell_resistance(
        &mut self,
        row: usize,
        col: usize,
        level: ResistanceLevel,
    ) -> CrossbarResult<()> {
        self.cell_mut(row, col)?.resistance = level;
        Ok(())
    }

    /// Habilita ou desabilita o seletor de uma célula
    pub fn set_selector(&mut self, row: usize, col: usize, enabled: bool) -> CrossbarResult<()> {
        self.cell_mut(row, col)?.selector = enabled;
        Ok(())
    }

    /// Toggle manual do nível; retorna o novo nível
    pub fn toggle_resistance(&mut self, row: usize, col: usize) -> CrossbarResult<ResistanceLevel> {
        let cell = self.cell_mut(row, col)?;
        cell.resistance = cell.resistance.toggled();
        Ok(cell.resistance)
    }

    /// Toggle manual do seletor; retorna o novo estado
    pub fn toggle_selector(&mut self, row: usize, col: usize) -> CrossbarResult<bool> {
        let cell = self.cell_mut(row, col)?;
        cell.selector = !cell.selector;
        Ok(cell.selector)
    }

    /// Volta todas as células para HRS com seletor habilitado
    pub fn reset(&mut self) {
        self.cells = [[CrossbarCell::default(); CROSSBAR_SIZE]; CROSSBAR_SIZE];
    }

    /// Volta todas as resistências para HRS; seletores não mudam
    pub fn clear_resistances(&mut self) {
        self.cells
            .iter_mut()
            .flatten()
            .for_each(|cell| cell.resistance = ResistanceLevel::High);
    }

    /// Espelha bits lógicos em níveis de resistência (1 → LRS, 0 → HRS)
    ///
    /// Coordenadas fora do crossbar são ignoradas; seletores não mudam.
    /// Retorna quantas células foram escritas.
    pub fn load_bits<I>(&mut self, bits: I) -> usize
    where
        I: IntoIterator<Item = ((usize, usize), bool)>,
    {
        let mut written = 0;
        for ((row, col), bit) in bits {
            if let Ok(cell) = self.cell_mut(row, col) {
                cell.resistance = ResistanceLevel::from_bit(bit);
                written += 1;
            }
        }
        written
    }

    /// Condutância efetiva (0 com seletor desabilitado)
    pub fn conductance(&self, row: usize, col: usize) -> CrossbarResult<f64> {
        Ok(self.cell(row, col)?.conductance(&self.params))
    }

    /// Correntes por célula e por coluna, recalculadas do zero
    pub fn compute_currents(&self, drive: &DriveConfig) -> Currents {
        let mut per_cell = [[0.0; CROSSBAR_SIZE]; CROSSBAR_SIZE];
        let mut column_totals = [0.0; CROSSBAR_SIZE];

        for (row, cells) in self.cells.iter().enumerate() {
            let v_row = drive.row_voltage(row);
            for (col, cell) in cells.iter().enumerate() {
                let current = v_row * cell.conductance(&self.params);
                per_cell[row][col] = current;
                column_totals[col] += current;
            }
        }

        tracing::trace!(?column_totals, v_drive = drive.voltage(), "crossbar currents computed");
        Currents {
            per_cell,
            column_totals,
        }
    }

    /// Correntes + bit derivado pela política de leitura
    pub fn simulate(&self, drive: &DriveConfig, policy: &ReadoutPolicy) -> SimulationResult {
        let currents = self.compute_currents(drive);
        let threshold = policy.threshold(drive.voltage(), self.params.r_low);
        let output = policy.readout(&currents.column_totals, drive.voltage(), self.params.r_low);
        SimulationResult {
            currents,
            v_drive: drive.voltage(),
            threshold,
            reference_column: policy.reference_column,
            output,
        }
    }
}

impl Default for Crossbar {
    fn default() -> Self {
        Self {
            cells: [[CrossbarCell::default(); CROSSBAR_SIZE]; CROSSBAR_SIZE],
            params: ElectricalParams::default(),
        }
    }
}

/// Correntes (A) por célula e total por bit-line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Currents {
    pub per_cell: [[f64; CROSSBAR_SIZE]; CROSSBAR_SIZE],
    pub column_totals: [f64; CROSSBAR_SIZE],
}

impl Currents {
    /// Corrente de uma célula
    pub fn at(&self, row: usize, col: usize) -> Option<f64> {
        self.per_cell.get(row)?.get(col).copied()
    }

    /// Corrente total de uma bit-line
    pub fn column_total(&self, col: usize) -> Option<f64> {
        self.column_totals.get(col).copied()
    }

    /// Corrente da coluna que não passa pela célula endereçada
    pub fn sneak_current(&self, col: usize, addressed_row: usize) -> Option<f64> {
        Some(self.column_total(col)? - self.at(addressed_row, col)?)
    }

    /// Fração da corrente da coluna vinda de caminhos sneak (0 se a coluna não conduz)
    pub fn sneak_ratio(&self, col: usize, addressed_row: usize) -> Option<f64> {
        let total = self.column_total(col)?;
        let sneak = self.sneak_current(col, addressed_row)?;
        Some(if total > 0.0 { sneak / total } else { 0.0 })
    }

    /// Soma de todas as colunas
    pub fn total(&self) -> f64 {
        self.column_totals.iter().sum()
    }
}

/// Resultado derivado de uma leitura; nunca atualizado incrementalmente
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub currents: Currents,
    pub v_drive: f64,
    /// Limiar usado (A)
    pub threshold: f64,
    pub reference_column: usize,
    pub output: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_no_drive_no_current() {
        let xbar = Crossbar::default();
        let result = xbar.simulate(&DriveConfig::undriven(1.0).unwrap(), &ReadoutPolicy::default());

        assert!(result.currents.per_cell.iter().flatten().all(|&i| i == 0.0));
        assert!(result.currents.column_totals.iter().all(|&i| i == 0.0));
        assert!(!result.output);
    }

    #[test]
    fn test_single_low_cell_current() {
        let mut xbar = Crossbar::default();
        xbar.set_cell_resistance(0, 0, ResistanceLevel::Low).unwrap();
        let drive = DriveConfig::from_inputs(true, false, 0.8).unwrap();

        let currents = xbar.compute_currents(&drive);
        assert!(approx(currents.at(0, 0).unwrap(), 0.8 / 1_000.0));
        // HRS na mesma linha conduz pouco
        assert!(approx(currents.at(0, 1).unwrap(), 0.8 / 100_000.0));
        // linha 1 não acionada
        assert_eq!(currents.at(1, 0), Some(0.0));

        xbar.set_selector(0, 0, false).unwrap();
        assert_eq!(xbar.compute_currents(&drive).at(0, 0), Some(0.0));
    }

    #[test]
    fn test_column_total_is_sum_of_rows() {
        let mut xbar = Crossbar::default();
        xbar.set_cell_resistance(0, 2, ResistanceLevel::Low).unwrap();
        xbar.set_cell_resistance(1, 2, ResistanceLevel::Low).unwrap();
        let drive = DriveConfig::from_inputs(true, true, 1.0).unwrap();

        let currents = xbar.compute_currents(&drive);
        assert!(approx(currents.column_totals[2], 2.0e-3));
        assert!(approx(currents.column_totals[0], 2.0e-5));
    }

    #[test]
    fn test_sneak_current() {
        let mut xbar = Crossbar::default();
        xbar.set_cell_resistance(0, 0, ResistanceLevel::Low).unwrap();
        xbar.set_cell_resistance(1, 0, ResistanceLevel::Low).unwrap();

        let single = xbar.compute_currents(&DriveConfig::from_inputs(true, false, 1.0).unwrap());
        assert_eq!(single.sneak_current(0, 0), Some(0.0));
        assert_eq!(single.sneak_ratio(0, 0), Some(0.0));

        let both = xbar.compute_currents(&DriveConfig::from_inputs(true, true, 1.0).unwrap());
        let sneak = both.sneak_current(0, 0).unwrap();
        assert!(approx(sneak, 1.0e-3));
        assert!(approx(both.sneak_ratio(0, 0).unwrap(), 0.5));
        assert_eq!(both.sneak_current(4, 0), None);
    }

    #[test]
    fn test_fully_deselected_reads_zero() {
        let mut xbar = Crossbar::default();
        for row in 0..CROSSBAR_SIZE {
            for col in 0..CROSSBAR_SIZE {
                xbar.set_cell_resistance(row, col, ResistanceLevel::Low).unwrap();
                xbar.set_selector(row, col, false).unwrap();
            }
        }
        let drive = DriveConfig::new([true; CROSSBAR_SIZE], 1.0).unwrap();
        let result = xbar.simulate(&drive, &ReadoutPolicy::default());
        assert_eq!(result.currents.total(), 0.0);
        assert!(!result.output);
    }

    #[test]
    fn test_readout_high_when_low_cell_driven() {
        let mut xbar = Crossbar::default();
        xbar.set_cell_resistance(0, 0, ResistanceLevel::Low).unwrap();
        let result = xbar.simulate(
            &DriveConfig::from_inputs(true, false, 1.0).unwrap(),
            &ReadoutPolicy::default(),
        );
        assert!(result.output);
        assert!(approx(result.threshold, 0.35e-3));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut xbar = Crossbar::default();
        assert!(matches!(
            xbar.set_selector(4, 0, false),
            Err(CrossbarError::OutOfBounds { row: 4, col: 0, size: 4 })
        ));
        assert!(xbar.toggle_resistance(0, 9).is_err());
        assert!(xbar.cell(2, 3).is_ok());
    }

    #[test]
    fn test_toggles_and_reset() {
        let mut xbar = Crossbar::default();
        assert_eq!(xbar.toggle_resistance(1, 1).unwrap(), ResistanceLevel::Low);
        assert!(!xbar.toggle_selector(1, 1).unwrap());
        xbar.reset();
        assert_eq!(*xbar.cell(1, 1).unwrap(), CrossbarCell::default());
    }

    #[test]
    fn test_clear_resistances_keeps_selectors() {
        let mut xbar = Crossbar::default();
        xbar.set_cell_resistance(1, 0, ResistanceLevel::Low).unwrap();
        xbar.set_cell_resistance(3, 3, ResistanceLevel::Low).unwrap();
        xbar.set_selector(3, 3, false).unwrap();

        xbar.clear_resistances();
        assert_eq!(xbar.cell(1, 0).unwrap().resistance, ResistanceLevel::High);
        assert_eq!(
            *xbar.cell(3, 3).unwrap(),
            CrossbarCell::new(ResistanceLevel::High, false)
        );
    }

    #[test]
    fn test_load_bits_skips_out_of_range() {
        let mut xbar = Crossbar::default();
        let written = xbar.load_bits([((0, 0), true), ((1, 3), false), ((5, 0), true)]);
        assert_eq!(written, 2);
        assert_eq!(xbar.cell(0, 0).unwrap().resistance, ResistanceLevel::Low);
        assert_eq!(xbar.cell(1, 3).unwrap().resistance, ResistanceLevel::High);
    }

    #[test]
    fn test_rejects_invalid_params() {
        let bad = ElectricalParams { r_low: 0.0, r_high: 1.0 };
        assert!(Crossbar::new(bad).is_err());
        assert!(Crossbar::default().set_params(bad).is_err());
    }
}
