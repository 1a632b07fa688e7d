//! Grade lógica de células memristivas
//!
//! A grade tem limites explícitos: todas as coordenadas em
//! `[0, rows) × [0, cols)` existem (estado 0) desde o reset, e qualquer
//! acesso fora desse intervalo retorna [`LogicError::OutOfBounds`].

use crate::coord::Coord;
use crate::error::{LogicError, LogicResult};
use crate::instruction::{Instruction, OpCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Origem de uma entrada de histórico
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryOp {
    /// Escrita forçada (seed de entrada ou toggle manual)
    Set,
    /// Operação do interpretador
    Op(OpCode),
    /// Resultado de referência gravado ao final de uma execução
    Reference,
}

impl fmt::Display for HistoryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set => f.write_str("SET"),
            Self::Op(op) => f.write_str(op.mnemonic()),
            Self::Reference => f.write_str("REF"),
        }
    }
}

/// Entrada no histórico de uma célula
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub op: HistoryOp,
    /// Microsegundos desde epoch
    pub timestamp_us: u64,
    /// Valor resultante
    pub value: bool,
    /// Valores dos operandos (apenas `NOR`)
    pub operands: Option<(bool, bool)>,
}

/// Célula com estado binário e histórico ordenado
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    state: bool,
    history: Vec<HistoryEntry>,
}

impl Cell {
    /// Retorna estado atual
    pub fn state(&self) -> bool {
        self.state
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    fn write(&mut self, op: HistoryOp, value: bool, operands: Option<(bool, bool)>) {
        self.state = value;
        self.history.push(HistoryEntry {
            op,
            timestamp_us: now_us(),
            value,
            operands,
        });
    }
}

fn now_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

/// Limite de células de uma grade
pub const MAX_CELLS: usize = 1 << 20;

/// Grade lógica densa com limites validados
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl LogicGrid {
    /// Cria grade zerada
    pub fn new(rows: usize, cols: usize) -> LogicResult<Self> {
        let mut grid = Self {
            rows: 0,
            cols: 0,
            cells: Vec::new(),
        };
        grid.reset(rows, cols)?;
        Ok(grid)
    }

    /// Retorna número de linhas
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Retorna número de colunas
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Retorna dimensões (linhas, colunas)
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Verifica se a coordenada está dentro da grade
    pub fn contains(&self, coord: Coord) -> bool {
        coord.row < self.rows && coord.col < self.cols
    }

    fn index(&self, coord: Coord) -> LogicResult<usize> {
        if self.contains(coord) {
            Ok(coord.row * self.cols + coord.col)
        } else {
            Err(LogicError::OutOfBounds {
                row: coord.row,
                col: coord.col,
                rows: self.rows,
                cols: self.cols,
            })
        }
    }

    /// Limpa todas as células e redimensiona
    ///
    /// Dimensões nulas ou acima de [`MAX_CELLS`] células deixam a grade intacta.
    pub fn reset(&mut self, rows: usize, cols: usize) -> LogicResult<()> {
        let len = rows
            .checked_mul(cols)
            .filter(|&len| len > 0 && len <= MAX_CELLS)
            .ok_or(LogicError::InvalidDimensions { rows, cols })?;
        self.rows = rows;
        self.cols = cols;
        self.cells.clear();
        self.cells.resize_with(len, Cell::default);
        tracing::trace!(rows, cols, "logic grid reset");
        Ok(())
    }

    /// Zera as células mantendo as dimensões
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|cell| *cell = Cell::default());
    }

    /// Obtém célula
    pub fn cell(&self, coord: Coord) -> LogicResult<&Cell> {
        let idx = self.index(coord)?;
        Ok(&self.cells[idx])
    }

    /// Obtém estado de uma célula
    pub fn get_state(&self, coord: Coord) -> LogicResult<bool> {
        self.cell(coord).map(Cell::state)
    }

    /// Força o estado (histórico `SET`)
    pub fn set_state(&mut self, coord: Coord, value: bool) -> LogicResult<()> {
        let idx = self.index(coord)?;
        self.cells[idx].write(HistoryOp::Set, value, None);
        Ok(())
    }

    /// Toggle manual; retorna o novo estado
    pub fn toggle(&mut self, coord: Coord) -> LogicResult<bool> {
        let value = !self.get_state(coord)?;
        self.set_state(coord, value)?;
        Ok(value)
    }

    /// Inverte a célula alvo; retorna o novo estado
    pub fn invert(&mut self, target: Coord) -> LogicResult<bool> {
        let idx = self.index(target)?;
        let value = !self.cells[idx].state;
        self.cells[idx].write(HistoryOp::Op(OpCode::Invert), value, None);
        Ok(value)
    }

    /// `target = !(a | b)`; operandos lidos antes da escrita
    pub fn nor_write(&mut self, target: Coord, a: Coord, b: Coord) -> LogicResult<bool> {
        let idx = self.index(target)?;
        let va = self.get_state(a)?;
        let vb = self.get_state(b)?;
        let value = !(va || vb);
        self.cells[idx].write(HistoryOp::Op(OpCode::NorWrite), value, Some((va, vb)));
        Ok(value)
    }

    /// Grava o resultado autoritativo (tabela-verdade) na célula de saída
    pub fn commit_reference(&mut self, target: Coord, value: bool) -> LogicResult<()> {
        let idx = self.index(target)?;
        self.cells[idx].write(HistoryOp::Reference, value, None);
        Ok(())
    }

    /// Histórico de operações de uma célula
    pub fn history(&self, coord: Coord) -> LogicResult<&[HistoryEntry]> {
        self.cell(coord).map(Cell::history)
    }

    /// Executa uma instrução
    ///
    /// Aridade e limites de todos os operandos são verificados antes de
    /// qualquer escrita: uma instrução inválida não altera a grade.
    pub fn execute(&mut self, instruction: &Instruction) -> LogicResult<()> {
        instruction.validate()?;
        for operand in instruction.operands() {
            self.index(*operand)?;
        }

        let ops = instruction.operands();
        match instruction.opcode() {
            OpCode::Invert => {
                let value = self.invert(ops[0])?;
                tracing::debug!(%instruction, value, "executed");
            }
            OpCode::NorWrite => {
                let value = self.nor_write(ops[0], ops[1], ops[2])?;
                tracing::debug!(%instruction, value, "executed");
            }
            OpCode::Isolate | OpCode::Combine | OpCode::JumpSet | OpCode::JumpReset => {
                tracing::debug!(%instruction, "control instruction, no state change");
            }
        }
        Ok(())
    }

    /// Snapshot imutável para renderização
    pub fn snapshot(&self) -> Snapshot {
        let cells = self
            .cells
            .chunks(self.cols.max(1))
            .map(|row| row.iter().map(Cell::state).collect())
            .collect();
        Snapshot {
            rows: self.rows,
            cols: self.cols,
            cells,
        }
    }
}

impl Default for LogicGrid {
    fn default() -> Self {
        Self {
            rows: 1,
            cols: 1,
            cells: vec![Cell::default()],
        }
    }
}

/// Estado pontual de todas as células, linha a linha
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub rows: usize,
    pub cols: usize,
    pub cells: Vec<Vec<bool>>,
}

impl Snapshot {
    /// Bit de uma coordenada
    pub fn get(&self, coord: Coord) -> Option<bool> {
        self.cells.get(coord.row)?.get(coord.col).copied()
    }

    /// Itera em ordem row-major
    pub fn iter(&self) -> impl Iterator<Item = (Coord, bool)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, bits)| {
            bits.iter()
                .enumerate()
                .map(move |(col, &bit)| (Coord::new(row, col), bit))
        })
    }

    /// Número de células em 1
    pub fn count_ones(&self) -> usize {
        self.iter().filter(|(_, bit)| *bit).count()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let line: Vec<&str> = row.iter().map(|&b| if b { "1" } else { "0" }).collect();
            f.write_str(&line.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(row: usize, col: usize) -> Coord {
        Coord::new(row, col)
    }

    #[test]
    fn test_reset_zeroes_every_cell() {
        let mut grid = LogicGrid::new(2, 2).unwrap();
        grid.set_state(c(1, 1), true).unwrap();
        grid.reset(3, 4).unwrap();

        assert_eq!(grid.dimensions(), (3, 4));
        for row in 0..3 {
            for col in 0..4 {
                assert!(!grid.get_state(c(row, col)).unwrap());
                assert!(grid.history(c(row, col)).unwrap().is_empty());
            }
        }
    }

    #[test]
    fn test_reset_rejects_zero_dimensions() {
        let mut grid = LogicGrid::new(1, 3).unwrap();
        grid.set_state(c(0, 2), true).unwrap();

        let err = grid.reset(0, 3).unwrap_err();
        assert_eq!(err, LogicError::InvalidDimensions { rows: 0, cols: 3 });
        assert_eq!(grid.dimensions(), (1, 3));
        assert!(grid.get_state(c(0, 2)).unwrap());
    }

    #[test]
    fn test_reset_rejects_oversized_dimensions() {
        let mut grid = LogicGrid::new(2, 4).unwrap();
        assert_eq!(
            grid.reset(usize::MAX, 2).unwrap_err(),
            LogicError::InvalidDimensions { rows: usize::MAX, cols: 2 }
        );
        assert!(grid.reset(MAX_CELLS + 1, 1).is_err());
        assert!(LogicGrid::new(usize::MAX / 2, 2).is_err());
        assert_eq!(grid.dimensions(), (2, 4));
    }

    #[test]
    fn test_out_of_bounds_is_an_error() {
        let mut grid = LogicGrid::new(1, 2).unwrap();
        assert!(matches!(grid.get_state(c(0, 2)), Err(LogicError::OutOfBounds { .. })));
        assert!(matches!(grid.set_state(c(1, 0), true), Err(LogicError::OutOfBounds { .. })));
        assert!(matches!(grid.invert(c(5, 5)), Err(LogicError::OutOfBounds { .. })));
    }

    #[test]
    fn test_set_then_invert() {
        let mut grid = LogicGrid::new(1, 1).unwrap();
        grid.set_state(c(0, 0), true).unwrap();
        assert!(grid.get_state(c(0, 0)).unwrap());

        assert!(!grid.invert(c(0, 0)).unwrap());
        assert!(!grid.get_state(c(0, 0)).unwrap());

        let history = grid.history(c(0, 0)).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].op, HistoryOp::Set);
        assert_eq!(history[1].op, HistoryOp::Op(OpCode::Invert));
        assert!(!history[1].value);
    }

    #[test]
    fn test_nor_write_truth_table() {
        let cases = [
            (false, false, true),
            (false, true, false),
            (true, false, false),
            (true, true, false),
        ];
        for (a, b, expected) in cases {
            let mut grid = LogicGrid::new(1, 3).unwrap();
            grid.set_state(c(0, 0), a).unwrap();
            grid.set_state(c(0, 1), b).unwrap();
            let value = grid.nor_write(c(0, 2), c(0, 0), c(0, 1)).unwrap();

            assert_eq!(value, expected, "NOR({a}, {b})");
            assert_eq!(grid.get_state(c(0, 2)).unwrap(), expected);
            let entry = grid.history(c(0, 2)).unwrap().last().unwrap().clone();
            assert_eq!(entry.operands, Some((a, b)));
            assert_eq!(entry.op.to_string(), "NOR");
        }
    }

    #[test]
    fn test_nor_write_target_may_alias_operand() {
        let mut grid = LogicGrid::new(1, 2).unwrap();
        grid.set_state(c(0, 0), true).unwrap();
        assert!(!grid.nor_write(c(0, 0), c(0, 0), c(0, 1)).unwrap());
    }

    #[test]
    fn test_execute_control_ops_do_not_mutate() {
        let mut grid = LogicGrid::new(1, 2).unwrap();
        grid.set_state(c(0, 1), true).unwrap();
        let before = grid.snapshot();

        grid.execute(&Instruction::isolate([c(0, 0), c(0, 1)])).unwrap();
        grid.execute(&Instruction::combine(Vec::<Coord>::new())).unwrap();
        grid.execute(&Instruction::jump_set([c(0, 0)])).unwrap();
        grid.execute(&Instruction::jump_reset([c(0, 1)])).unwrap();

        assert_eq!(grid.snapshot(), before);
        assert!(grid.history(c(0, 0)).unwrap().is_empty());
    }

    #[test]
    fn test_execute_invalid_instruction_leaves_grid_untouched() {
        let mut grid = LogicGrid::new(1, 3).unwrap();
        grid.set_state(c(0, 0), true).unwrap();
        let before = grid.clone();

        // alvo válido, operando fora dos limites
        let bad = Instruction::nor_write(c(0, 2), c(0, 0), c(4, 4));
        assert!(grid.execute(&bad).is_err());
        assert_eq!(grid, before);

        let bad_control = Instruction::isolate([c(9, 9)]);
        assert!(grid.execute(&bad_control).is_err());
        assert_eq!(grid, before);
    }

    #[test]
    fn test_snapshot_layout() {
        let mut grid = LogicGrid::new(2, 3).unwrap();
        grid.set_state(c(1, 2), true).unwrap();
        let snap = grid.snapshot();

        assert_eq!(snap.cells, vec![vec![false, false, false], vec![false, false, true]]);
        assert_eq!(snap.get(c(1, 2)), Some(true));
        assert_eq!(snap.get(c(2, 0)), None);
        assert_eq!(snap.count_ones(), 1);
        assert_eq!(snap.to_string(), "0 0 0\n0 0 1");
        assert_eq!(snap.iter().count(), 6);
    }

    #[test]
    fn test_toggle_and_clear() {
        let mut grid = LogicGrid::new(1, 2).unwrap();
        assert!(grid.toggle(c(0, 1)).unwrap());
        assert!(!grid.toggle(c(0, 1)).unwrap());
        grid.toggle(c(0, 0)).unwrap();
        grid.clear();
        assert_eq!(grid.snapshot().count_ones(), 0);
        assert_eq!(grid.dimensions(), (1, 2));
    }

    #[test]
    fn test_commit_reference_tag() {
        let mut grid = LogicGrid::new(1, 1).unwrap();
        grid.commit_reference(c(0, 0), true).unwrap();
        let entry = &grid.history(c(0, 0)).unwrap()[0];
        assert_eq!(entry.op, HistoryOp::Reference);
        assert_eq!(entry.op.to_string(), "REF");
    }
}
