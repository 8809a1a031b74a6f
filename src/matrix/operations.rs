//! Операции над матрицами

use std::io::{self, Write};

use ndarray::ArrayView2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::Matrix;

/// Генератор с фиксированным зерном: одно зерно дает одинаковые матрицы
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Заполняет данные случайными числами из [0, 1)
pub fn random_init<R: Rng>(data: &mut [f32], rng: &mut R) {
    for value in data.iter_mut() {
        *value = rng.gen::<f32>();
    }
}

/// Печатает матрицу построчно, по 6 знаков после запятой
pub fn write_matrix<W: Write + ?Sized>(out: &mut W, matrix: &Matrix) -> io::Result<()> {
    if matrix.cols() == 0 {
        return Ok(());
    }
    for row in matrix.as_slice().chunks(matrix.cols()) {
        for value in row {
            write!(out, "{:.6} ", value)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// CPU реализация матричного умножения; `None`, если внутренние размерности не совпадают
pub fn cpu_matrix_multiply(a: &Matrix, b: &Matrix) -> Option<Matrix> {
    if a.cols() != b.rows() {
        return None;
    }
    let a_view = ArrayView2::from_shape((a.rows(), a.cols()), a.as_slice()).ok()?;
    let b_view = ArrayView2::from_shape((b.rows(), b.cols()), b.as_slice()).ok()?;

    let c = a_view.dot(&b_view);
    Matrix::from_vec(a.rows(), b.cols(), c.iter().copied().collect())
}

/// Итог сравнения результатов устройства и CPU
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub mismatches: usize,
    pub max_diff: f32,
}

impl Comparison {
    pub fn matches(&self) -> bool {
        self.mismatches == 0
    }
}

/// Сравнивает результаты с относительной погрешностью `rel_tol`
pub fn compare_results(device: &[f32], cpu: &[f32], rel_tol: f32) -> Comparison {
    let mut mismatches = device.len().abs_diff(cpu.len());
    let mut max_diff = 0.0f32;

    for (&d, &c) in device.iter().zip(cpu) {
        let diff = (d - c).abs();
        // NaN тоже считается расхождением
        if !(diff <= rel_tol * c.abs().max(1.0)) {
            mismatches += 1;
            max_diff = max_diff.max(diff);
        }
    }

    Comparison { mismatches, max_diff }
}
