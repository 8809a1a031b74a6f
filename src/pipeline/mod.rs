//! Конвейер умножения матриц на устройстве
//!
//! Стадии идут строго по порядку: матрицы хоста, выбор устройства,
//! контекст и очередь, буферы устройства, сборка ядра, запуск, чтение
//! результата. Ошибка любой стадии прерывает конвейер; все уже созданные
//! объекты OpenCL освобождаются их обертками.

pub mod builder;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod host;
pub mod selector;
pub mod staging;

use std::io::{self, Write};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{MatMulError, Result};
use crate::matrix::{compare_results, cpu_matrix_multiply, Matrix};
use crate::opencl::{ClApi, CommandQueue, Context, Kernel, Program};
use crate::utils::measure_time;

pub use builder::KERNEL_ENTRY_POINT;
pub use config::PipelineConfig;
pub use dispatch::{WorkGeometry, DISPATCH_GEOMETRY};

use host::HostMatrices;
use staging::StagedBuffers;

/// Допустимое относительное расхождение с CPU
pub const VERIFY_TOLERANCE: f32 = 1e-3;

/// Состояние конвейера. Любая ошибка до `Released` ведет в `FatalAbort`
/// после освобождения того, что успели создать.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    PlatformsEnumerated,
    DeviceSelected,
    ContextReady,
    BuffersStaged,
    ProgramBuilt,
    KernelBound,
    Dispatched,
    ResultRead,
    Released,
    FatalAbort,
}

/// Чем закончился прогон
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTrace {
    /// `Released` или `FatalAbort`
    pub state: PipelineState,
    /// Последняя пройденная стадия перед ошибкой
    pub failed_at: Option<PipelineState>,
}

/// Итог успешного прогона
#[derive(Debug, Clone)]
pub struct RunReport {
    pub platform_name: String,
    pub device_name: String,
    /// Матрица C, прочитанная с устройства
    pub result: Matrix,
    /// Время запуска ядра вместе с блокирующим чтением
    pub elapsed: Duration,
}

/// Выполняет весь конвейер на `api`
pub fn run<A: ClApi + ?Sized>(api: &A, config: &PipelineConfig) -> Result<RunReport> {
    run_traced(api, config).0
}

/// То же, что [`run`], но вместе с конечным состоянием конвейера
pub fn run_traced<A: ClApi + ?Sized>(
    api: &A,
    config: &PipelineConfig,
) -> (Result<RunReport>, RunTrace) {
    let mut state = PipelineState::Init;
    let outcome = run_stages(api, config, &mut state);
    // Здесь все объекты OpenCL уже освобождены
    let failed_at = match &outcome {
        Ok(_) => None,
        Err(err) => {
            debug!(state = ?state, "Конвейер прерван: {}", err);
            Some(state)
        }
    };
    let terminal = if failed_at.is_some() {
        PipelineState::FatalAbort
    } else {
        PipelineState::Released
    };
    advance(&mut state, terminal);

    (outcome, RunTrace { state, failed_at })
}

fn advance(state: &mut PipelineState, next: PipelineState) {
    debug!(from = ?*state, to = ?next, "Переход конвейера");
    *state = next;
}

fn run_stages<A: ClApi + ?Sized>(
    api: &A,
    config: &PipelineConfig,
    state: &mut PipelineState,
) -> Result<RunReport> {
    // Локальные переменные освобождаются в порядке, обратном объявлению:
    // матрицы хоста, буферы A, B, C, контекст, ядро, программа, очередь.
    let queue: CommandQueue<'_, A>;
    let program: Program<'_, A>;
    let kernel: Kernel<'_, A>;
    let context: Context<'_, A>;
    let buffers: StagedBuffers<'_, A>;
    let mut host: HostMatrices;

    host = HostMatrices::allocate(config.seed);
    if config.print_matrices {
        dump(|out| host.write_inputs(out));
    }

    let platforms = selector::enumerate_platforms(api)?;
    advance(state, PipelineState::PlatformsEnumerated);

    let selected = selector::select_device(api, &platforms, &config.excluded_vendor)?;
    advance(state, PipelineState::DeviceSelected);

    (context, queue) = context::establish(api, selected.device)?;
    advance(state, PipelineState::ContextReady);

    // Исходник читается до выделения буферов: без него они не нужны
    let source = builder::load_source(&config.kernel_path)?;

    buffers = staging::stage(api, &context, &host)?;
    advance(state, PipelineState::BuffersStaged);

    program = builder::build_program(api, &context, selected.device, &source)?;
    advance(state, PipelineState::ProgramBuilt);

    kernel = builder::create_kernel(api, &program, KERNEL_ENTRY_POINT)?;
    dispatch::bind_arguments(api, &kernel, &buffers, host.a.cols(), host.c.cols())?;
    advance(state, PipelineState::KernelBound);

    let (outcome, elapsed) = measure_time(|| -> Result<()> {
        dispatch::launch(api, &queue, &kernel, &DISPATCH_GEOMETRY)?;
        advance(state, PipelineState::Dispatched);
        dispatch::read_result(api, &queue, &buffers.c, &mut host.c)?;
        advance(state, PipelineState::ResultRead);
        Ok(())
    });
    outcome?;
    info!("Результаты матрицы C получены за {:?}", elapsed);

    if config.print_matrices {
        dump(|out| host.write_result(out));
    }
    if config.verify {
        verify(&host)?;
    }

    Ok(RunReport {
        platform_name: selected.platform_name,
        device_name: selected.device_name,
        result: host.c,
        elapsed,
    })
}

/// Сверяет C с произведением A и B, посчитанным на CPU
fn verify(host: &HostMatrices) -> Result<()> {
    info!("Проверка результата на CPU...");
    let (expected, cpu_duration) = measure_time(|| cpu_matrix_multiply(&host.a, &host.b));
    let expected = expected.ok_or(MatMulError::Verification {
        mismatches: host.c.len(),
        max_diff: f32::NAN,
    })?;

    let comparison = compare_results(host.c.as_slice(), expected.as_slice(), VERIFY_TOLERANCE);
    if !comparison.matches() {
        return Err(MatMulError::Verification {
            mismatches: comparison.mismatches,
            max_diff: comparison.max_diff,
        });
    }
    info!("Результаты устройства и CPU совпадают (CPU: {:?})", cpu_duration);
    Ok(())
}

/// Вывод матриц на консоль; ошибка записи не прерывает конвейер
fn dump<F>(write: F)
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(err) = write(&mut out).and_then(|()| out.flush()) {
        warn!("Не удалось вывести матрицу: {}", err);
    }
}
