//! Матрица и фиксированные размеры задачи

use std::mem;

/// Ширина A (число столбцов)
pub const WA: usize = 1024;
/// Высота A (число строк)
pub const HA: usize = 1024;
pub const WB: usize = 1024;
pub const HB: usize = 1024;
pub const WC: usize = 1024;
pub const HC: usize = 1024;

// Внутренняя размерность должна совпадать, а C иметь форму HA × WB
const _: () = assert!(WA == HB && WC == WB && HC == HA);

/// Плотная матрица `f32` в построчном порядке
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Матрица `rows × cols`, заполненная нулями
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self { rows, cols, data: vec![0.0; rows * cols] }
    }

    /// Оборачивает готовые данные; `None`, если длина не равна `rows * cols`
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == rows * cols).then_some(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Размер данных в байтах, он же размер буфера устройства
    pub fn byte_len(&self) -> usize {
        self.data.len() * mem::size_of::<f32>()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }
}
