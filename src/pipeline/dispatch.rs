//! Аргументы ядра, геометрия запуска, чтение результата

use tracing::info;

use crate::error::{MatMulError, Result};
use crate::matrix::Matrix;
use crate::opencl::types::{cl_int, cl_uint, CL_INVALID_VALUE};
use crate::opencl::{ClApi, CommandQueue, DeviceBuffer, Kernel, KernelArg};

use super::staging::StagedBuffers;

/// Двумерная сетка запуска: полный размер и размер рабочей группы
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkGeometry {
    pub global: [usize; 2],
    pub local: [usize; 2],
}

/// Фиксированная сетка: 512×512 рабочих элементов группами 16×16.
/// Ядро проходит выход с шагом в размер сетки, поэтому она меньше матриц.
pub const DISPATCH_GEOMETRY: WorkGeometry = WorkGeometry {
    global: [512, 512],
    local: [16, 16],
};

impl WorkGeometry {
    /// Каждая компонента ненулевая, локальная делит глобальную нацело
    pub fn validate(&self) -> Result<()> {
        let valid = self
            .global
            .iter()
            .zip(&self.local)
            .all(|(&global, &local)| global > 0 && local > 0 && global % local == 0);
        if valid {
            Ok(())
        } else {
            Err(MatMulError::Geometry {
                global: self.global,
                local: self.local,
            })
        }
    }

    /// Число рабочих групп по каждому измерению
    pub fn work_groups(&self) -> [usize; 2] {
        [self.global[0] / self.local[0], self.global[1] / self.local[1]]
    }
}

fn int_arg(index: cl_uint, value: usize) -> Result<KernelArg> {
    cl_int::try_from(value)
        .map(KernelArg::Int)
        .map_err(|_| MatMulError::KernelArg { index, code: CL_INVALID_VALUE })
}

/// Привязывает аргументы по позициям: C, A, B, внутренняя размерность, ширина C
pub fn bind_arguments<'a, A: ClApi + ?Sized>(
    api: &'a A,
    kernel: &Kernel<'a, A>,
    buffers: &StagedBuffers<'a, A>,
    inner_dim: usize,
    out_width: usize,
) -> Result<()> {
    info!("Установка аргументов ядра...");
    let args = [
        KernelArg::Buffer(buffers.c.as_raw()),
        KernelArg::Buffer(buffers.a.as_raw()),
        KernelArg::Buffer(buffers.b.as_raw()),
        int_arg(3, inner_dim)?,
        int_arg(4, out_width)?,
    ];

    for (index, arg) in (0..).zip(args) {
        api.set_kernel_arg(kernel.as_raw(), index, arg)
            .map_err(|code| MatMulError::KernelArg { index, code })?;
    }
    Ok(())
}

/// Ставит ядро в очередь; выполнение асинхронное
pub fn launch<'a, A: ClApi + ?Sized>(
    api: &'a A,
    queue: &CommandQueue<'a, A>,
    kernel: &Kernel<'a, A>,
    geometry: &WorkGeometry,
) -> Result<()> {
    geometry.validate()?;
    info!(
        global = ?geometry.global,
        local = ?geometry.local,
        groups = ?geometry.work_groups(),
        "Запуск вычислений на устройстве"
    );
    api.enqueue_kernel(queue.as_raw(), kernel.as_raw(), geometry.global, geometry.local)
        .map_err(|code| MatMulError::Dispatch { code })
}

/// Блокирующее чтение буфера результата. Очередь упорядочена, поэтому
/// возврат означает, что ядро завершилось и данные скопированы.
pub fn read_result<'a, A: ClApi + ?Sized>(
    api: &'a A,
    queue: &CommandQueue<'a, A>,
    buffer: &DeviceBuffer<'a, A>,
    out: &mut Matrix,
) -> Result<()> {
    api.read_buffer(queue.as_raw(), buffer.as_raw(), out.as_mut_slice())
        .map_err(|code| MatMulError::ReadBack { code })
}
