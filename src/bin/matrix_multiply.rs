//! Умножение двух матриц 1024×1024 на устройстве OpenCL
//!
//! Аргументы командной строки не читаются. Переключатели задаются
//! переменными `MATMUL_PRINT_MATRICES` и `MATMUL_VERIFY`, уровень лога через `RUST_LOG`.

use std::process::ExitCode;

use anyhow::{Context, Result};
use opencl_matmul::{run, MatMulError, OpenCl, PipelineConfig, RunReport};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn multiply() -> Result<RunReport> {
    let config = PipelineConfig::from_env();
    info!(
        kernel = %config.kernel_path.display(),
        print_matrices = config.print_matrices,
        verify = config.verify,
        "Начало умножения матриц на устройстве"
    );

    let api = OpenCl::new();
    run(&api, &config).context("Умножение матриц прервано")
}

fn main() -> ExitCode {
    init_logging();

    match multiply() {
        Ok(report) => {
            info!(
                platform = %report.platform_name,
                device = %report.device_name,
                "Готово за {:?}",
                report.elapsed
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{:#}", err);
            let code = err
                .downcast_ref::<MatMulError>()
                .map(MatMulError::exit_code)
                .unwrap_or(opencl_matmul::error::EXIT_FAILURE);
            ExitCode::from(code)
        }
    }
}
