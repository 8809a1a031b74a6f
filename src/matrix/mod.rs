//! Модуль для работы с матрицами
//!
//! Предоставляет:
//! - Матрицу `f32` в построчном порядке и фиксированные размеры A, B, C
//! - Заполнение случайными числами, вывод на консоль
//! - CPU-реализацию умножения для проверки результата устройства

mod types;
pub mod operations;

pub use types::{Matrix, HA, HB, HC, WA, WB, WC};
pub use operations::{compare_results, cpu_matrix_multiply, random_init, seeded_rng, write_matrix, Comparison};
