//! Граница с вычислительным API устройства
//!
//! Конвейер работает через трейт [`ClApi`], а не через `bindings` напрямую:
//! нативная реализация [`OpenCl`] вызывает драйвер, тестовая считает
//! создания и освобождения дескрипторов.

use std::ffi::{c_char, c_void};
use std::mem;
use std::ptr;

use super::bindings::*;
use super::types::*;
use super::utils::{info_to_string, to_c_string};

/// Аргумент ядра для `clSetKernelArg`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelArg {
    /// Буфер устройства
    Buffer(cl_mem),
    /// 32-битное целое
    Int(cl_int),
}

/// Операции вычислительного API, которые использует конвейер.
///
/// Ошибка каждой операции это сырой код возврата OpenCL. Перевод в
/// [`crate::MatMulError`] делают стадии конвейера, знающие контекст вызова.
pub trait ClApi {
    /// До `max_entries` доступных платформ
    fn platform_ids(&self, max_entries: cl_uint) -> Result<Vec<cl_platform_id>, cl_int>;

    fn platform_name(&self, platform: cl_platform_id) -> Result<String, cl_int>;

    /// Одно устройство типа `CL_DEVICE_TYPE_DEFAULT`
    fn default_device(&self, platform: cl_platform_id) -> Result<cl_device_id, cl_int>;

    fn device_name(&self, device: cl_device_id) -> Result<String, cl_int>;

    fn create_context(&self, device: cl_device_id) -> Result<cl_context, cl_int>;

    /// Очередь без `CL_QUEUE_OUT_OF_ORDER_EXEC_MODE_ENABLE`
    fn create_command_queue(
        &self,
        context: cl_context,
        device: cl_device_id,
    ) -> Result<cl_command_queue, cl_int>;

    /// Буфер размером `size` байт. С `host_data` содержимое копируется при
    /// создании: `flags` должны включать `CL_MEM_COPY_HOST_PTR`, иначе
    /// `CL_INVALID_VALUE`. После возврата буфер не ссылается на `host_data`.
    fn create_buffer(
        &self,
        context: cl_context,
        flags: cl_mem_flags,
        size: usize,
        host_data: Option<&[f32]>,
    ) -> Result<cl_mem, cl_int>;

    fn create_program(&self, context: cl_context, source: &str) -> Result<cl_program, cl_int>;

    fn build_program(&self, program: cl_program, device: cl_device_id) -> Result<(), cl_int>;

    fn build_log(&self, program: cl_program, device: cl_device_id) -> Result<String, cl_int>;

    fn create_kernel(&self, program: cl_program, name: &str) -> Result<cl_kernel, cl_int>;

    fn set_kernel_arg(&self, kernel: cl_kernel, index: cl_uint, arg: KernelArg) -> Result<(), cl_int>;

    /// Асинхронный запуск ядра на двумерной сетке
    fn enqueue_kernel(
        &self,
        queue: cl_command_queue,
        kernel: cl_kernel,
        global: [usize; 2],
        local: [usize; 2],
    ) -> Result<(), cl_int>;

    /// Блокирующее чтение всего буфера в `out`
    fn read_buffer(
        &self,
        queue: cl_command_queue,
        buffer: cl_mem,
        out: &mut [f32],
    ) -> Result<(), cl_int>;

    fn release_mem_object(&self, buffer: cl_mem) -> cl_int;
    fn release_kernel(&self, kernel: cl_kernel) -> cl_int;
    fn release_program(&self, program: cl_program) -> cl_int;
    fn release_command_queue(&self, queue: cl_command_queue) -> cl_int;
    fn release_context(&self, context: cl_context) -> cl_int;
}

/// Нативная реализация поверх ICD-загрузчика OpenCL
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenCl;

impl OpenCl {
    pub fn new() -> Self {
        Self
    }
}

impl ClApi for OpenCl {
    fn platform_ids(&self, max_entries: cl_uint) -> Result<Vec<cl_platform_id>, cl_int> {
        let mut count: cl_uint = 0;
        match cl_check!(clGetPlatformIDs(max_entries, ptr::null_mut(), &mut count)) {
            Ok(()) => {}
            // ICD-загрузчик сообщает так об отсутствии платформ
            Err(CL_PLATFORM_NOT_FOUND_KHR) => return Ok(Vec::new()),
            Err(code) => return Err(code),
        }

        let count = count.min(max_entries);
        if count == 0 {
            return Ok(Vec::new());
        }

        let mut platforms = vec![ptr::null_mut(); count as usize];
        cl_check!(clGetPlatformIDs(count, platforms.as_mut_ptr(), ptr::null_mut()))?;
        Ok(platforms)
    }

    fn platform_name(&self, platform: cl_platform_id) -> Result<String, cl_int> {
        let mut size = 0usize;
        cl_check!(clGetPlatformInfo(platform, CL_PLATFORM_NAME, 0, ptr::null_mut(), &mut size))?;

        let mut info = vec![0u8; size];
        cl_check!(clGetPlatformInfo(
            platform,
            CL_PLATFORM_NAME,
            size,
            info.as_mut_ptr() as *mut c_void,
            ptr::null_mut()
        ))?;
        Ok(info_to_string(info))
    }

    fn default_device(&self, platform: cl_platform_id) -> Result<cl_device_id, cl_int> {
        let mut device: cl_device_id = ptr::null_mut();
        let mut num_devices: cl_uint = 0;
        cl_check!(clGetDeviceIDs(
            platform,
            CL_DEVICE_TYPE_DEFAULT,
            1,
            &mut device,
            &mut num_devices
        ))?;

        if num_devices == 0 || device.is_null() {
            return Err(CL_DEVICE_NOT_FOUND);
        }
        Ok(device)
    }

    fn device_name(&self, device: cl_device_id) -> Result<String, cl_int> {
        let mut size = 0usize;
        cl_check!(clGetDeviceInfo(device, CL_DEVICE_NAME, 0, ptr::null_mut(), &mut size))?;

        let mut info = vec![0u8; size];
        cl_check!(clGetDeviceInfo(
            device,
            CL_DEVICE_NAME,
            size,
            info.as_mut_ptr() as *mut c_void,
            ptr::null_mut()
        ))?;
        Ok(info_to_string(info))
    }

    fn create_context(&self, device: cl_device_id) -> Result<cl_context, cl_int> {
        cl_create!(clCreateContext(ptr::null(), 1, &device, None, ptr::null_mut()))
    }

    fn create_command_queue(
        &self,
        context: cl_context,
        device: cl_device_id,
    ) -> Result<cl_command_queue, cl_int> {
        cl_create!(clCreateCommandQueue(context, device, 0))
    }

    fn create_buffer(
        &self,
        context: cl_context,
        flags: cl_mem_flags,
        size: usize,
        host_data: Option<&[f32]>,
    ) -> Result<cl_mem, cl_int> {
        let host_ptr = match host_data {
            Some(data) => {
                // Без копирования драйвер держал бы указатель на заимствованный срез
                if flags & CL_MEM_COPY_HOST_PTR == 0 || data.len() * mem::size_of::<f32>() < size {
                    return Err(CL_INVALID_VALUE);
                }
                data.as_ptr() as *mut c_void
            }
            None => ptr::null_mut(),
        };
        cl_create!(clCreateBuffer(context, flags, size, host_ptr))
    }

    fn create_program(&self, context: cl_context, source: &str) -> Result<cl_program, cl_int> {
        let strings = source.as_ptr() as *const c_char;
        let lengths = source.len();
        cl_create!(clCreateProgramWithSource(context, 1, &strings, &lengths))
    }

    fn build_program(&self, program: cl_program, device: cl_device_id) -> Result<(), cl_int> {
        cl_check!(clBuildProgram(program, 1, &device, ptr::null(), None, ptr::null_mut()))
    }

    fn build_log(&self, program: cl_program, device: cl_device_id) -> Result<String, cl_int> {
        let mut log_size = 0usize;
        cl_check!(clGetProgramBuildInfo(
            program,
            device,
            CL_PROGRAM_BUILD_LOG,
            0,
            ptr::null_mut(),
            &mut log_size
        ))?;

        let mut log = vec![0u8; log_size];
        cl_check!(clGetProgramBuildInfo(
            program,
            device,
            CL_PROGRAM_BUILD_LOG,
            log_size,
            log.as_mut_ptr() as *mut c_void,
            ptr::null_mut()
        ))?;
        Ok(info_to_string(log))
    }

    fn create_kernel(&self, program: cl_program, name: &str) -> Result<cl_kernel, cl_int> {
        let name = to_c_string(name)?;
        cl_create!(clCreateKernel(program, name.as_ptr()))
    }

    fn set_kernel_arg(&self, kernel: cl_kernel, index: cl_uint, arg: KernelArg) -> Result<(), cl_int> {
        match arg {
            KernelArg::Buffer(buffer) => cl_check!(clSetKernelArg(
                kernel,
                index,
                mem::size_of::<cl_mem>(),
                &buffer as *const _ as *const c_void
            )),
            KernelArg::Int(value) => cl_check!(clSetKernelArg(
                kernel,
                index,
                mem::size_of::<cl_int>(),
                &value as *const _ as *const c_void
            )),
        }
    }

    fn enqueue_kernel(
        &self,
        queue: cl_command_queue,
        kernel: cl_kernel,
        global: [usize; 2],
        local: [usize; 2],
    ) -> Result<(), cl_int> {
        cl_check!(clEnqueueNDRangeKernel(
            queue,
            kernel,
            2,
            ptr::null(),
            global.as_ptr(),
            local.as_ptr(),
            0,
            ptr::null(),
            ptr::null_mut()
        ))
    }

    fn read_buffer(
        &self,
        queue: cl_command_queue,
        buffer: cl_mem,
        out: &mut [f32],
    ) -> Result<(), cl_int> {
        cl_check!(clEnqueueReadBuffer(
            queue,
            buffer,
            CL_TRUE,
            0,
            out.len() * mem::size_of::<f32>(),
            out.as_mut_ptr() as *mut c_void,
            0,
            ptr::null(),
            ptr::null_mut()
        ))
    }

    fn release_mem_object(&self, buffer: cl_mem) -> cl_int {
        unsafe { clReleaseMemObject(buffer) }
    }

    fn release_kernel(&self, kernel: cl_kernel) -> cl_int {
        unsafe { clReleaseKernel(kernel) }
    }

    fn release_program(&self, program: cl_program) -> cl_int {
        unsafe { clReleaseProgram(program) }
    }

    fn release_command_queue(&self, queue: cl_command_queue) -> cl_int {
        unsafe { clReleaseCommandQueue(queue) }
    }

    fn release_context(&self, context: cl_context) -> cl_int {
        unsafe { clReleaseContext(context) }
    }
}
