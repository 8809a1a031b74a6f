//! Матрицы на стороне хоста

use std::io::{self, Write};

use tracing::info;

use crate::matrix::{random_init, seeded_rng, write_matrix, Matrix, HA, HB, HC, WA, WB, WC};

/// Входные матрицы A и B и приемник результата C
#[derive(Debug, Clone)]
pub struct HostMatrices {
    pub a: Matrix,
    pub b: Matrix,
    pub c: Matrix,
}

impl HostMatrices {
    /// Выделяет A, B и C; A и B заполняются из одного генератора с зерном `seed`
    pub fn allocate(seed: u64) -> Self {
        let mut rng = seeded_rng(seed);
        let mut a = Matrix::zeros(HA, WA);
        let mut b = Matrix::zeros(HB, WB);

        info!("Заполнение матриц A и B случайными числами");
        random_init(a.as_mut_slice(), &mut rng);
        random_init(b.as_mut_slice(), &mut rng);

        Self { a, b, c: Matrix::zeros(HC, WC) }
    }

    pub fn write_inputs<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "\n\nМатрица A")?;
        write_matrix(out, &self.a)?;
        writeln!(out, "\n\nМатрица B")?;
        write_matrix(out, &self.b)?;
        writeln!(out, "\n")
    }

    pub fn write_result<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "Матрица C")?;
        write_matrix(out, &self.c)?;
        writeln!(out)
    }
}
