//! Контекст выполнения и очередь команд

use tracing::info;

use crate::error::{MatMulError, Result};
use crate::opencl::types::cl_device_id;
use crate::opencl::{ClApi, CommandQueue, Context};

/// Создает контекст для одного устройства и упорядоченную очередь к нему.
/// Если очередь создать не удалось, контекст освобождается здесь же.
pub fn establish<'a, A: ClApi + ?Sized>(
    api: &'a A,
    device: cl_device_id,
) -> Result<(Context<'a, A>, CommandQueue<'a, A>)> {
    let context = api
        .create_context(device)
        .map(|raw| Context::from_raw(api, raw))
        .map_err(|code| MatMulError::api("clCreateContext", code))?;

    info!("Создание очереди команд...");
    let queue = api
        .create_command_queue(context.as_raw(), device)
        .map(|raw| CommandQueue::from_raw(api, raw))
        .map_err(|code| MatMulError::api("clCreateCommandQueue", code))?;

    Ok((context, queue))
}
