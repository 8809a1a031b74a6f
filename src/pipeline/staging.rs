//! Размещение матриц в памяти устройства

use tracing::info;

use crate::error::{MatMulError, Result};
use crate::opencl::types::{CL_MEM_COPY_HOST_PTR, CL_MEM_READ_WRITE};
use crate::opencl::{ClApi, Context, DeviceBuffer};

use super::host::HostMatrices;

/// Буферы устройства для A, B и C.
/// Поля освобождаются в порядке объявления: A, B, C.
#[derive(Debug)]
pub struct StagedBuffers<'a, A: ClApi + ?Sized> {
    pub a: DeviceBuffer<'a, A>,
    pub b: DeviceBuffer<'a, A>,
    pub c: DeviceBuffer<'a, A>,
}

/// Создает три буфера. A и B копируются с хоста в момент создания,
/// C выделяется без содержимого.
pub fn stage<'a, A: ClApi + ?Sized>(
    api: &'a A,
    context: &Context<'a, A>,
    host: &HostMatrices,
) -> Result<StagedBuffers<'a, A>> {
    info!("Создание буферов OpenCL...");
    let copy_flags = CL_MEM_READ_WRITE | CL_MEM_COPY_HOST_PTR;

    let a = api
        .create_buffer(context.as_raw(), copy_flags, host.a.byte_len(), Some(host.a.as_slice()))
        .map(|raw| DeviceBuffer::from_raw(api, raw))
        .map_err(|code| MatMulError::api("clCreateBuffer(A)", code))?;

    let b = api
        .create_buffer(context.as_raw(), copy_flags, host.b.byte_len(), Some(host.b.as_slice()))
        .map(|raw| DeviceBuffer::from_raw(api, raw))
        .map_err(|code| MatMulError::api("clCreateBuffer(B)", code))?;

    let c = api
        .create_buffer(context.as_raw(), CL_MEM_READ_WRITE, host.c.byte_len(), None)
        .map(|raw| DeviceBuffer::from_raw(api, raw))
        .map_err(|code| MatMulError::api("clCreateBuffer(C)", code))?;

    Ok(StagedBuffers { a, b, c })
}
