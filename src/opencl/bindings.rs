//! Низкоуровневые привязки к OpenCL API
//!
//! Библиотеку подключает `build.rs`. Если OpenCL при сборке не найден,
//! вместо `extern`-блока компилируются заглушки с теми же сигнатурами:
//! перечисление платформ возвращает пустой список.

use super::types::*;
use std::ffi::{c_char, c_void};

#[cfg(opencl_runtime)]
unsafe extern "C" {
    pub fn clGetPlatformIDs(
        num_entries: cl_uint,
        platforms: *mut cl_platform_id,
        num_platforms: *mut cl_uint
    ) -> cl_int;

    pub fn clGetPlatformInfo(
        platform: cl_platform_id,
        param_name: cl_platform_info,
        param_value_size: usize,
        param_value: *mut c_void,
        param_value_size_ret: *mut usize
    ) -> cl_int;

    pub fn clGetDeviceIDs(
        platform: cl_platform_id,
        device_type: cl_device_type,
        num_entries: cl_uint,
        devices: *mut cl_device_id,
        num_devices: *mut cl_uint
    ) -> cl_int;

    pub fn clGetDeviceInfo(
        device: cl_device_id,
        param_name: cl_device_info,
        param_value_size: usize,
        param_value: *mut c_void,
        param_value_size_ret: *mut usize
    ) -> cl_int;

    pub fn clCreateContext(
        properties: *const cl_context_properties,
        num_devices: cl_uint,
        devices: *const cl_device_id,
        pfn_notify: Option<extern "C" fn()>,
        user_data: *mut c_void,
        errcode_ret: *mut cl_int
    ) -> cl_context;

    pub fn clCreateCommandQueue(
        context: cl_context,
        device: cl_device_id,
        properties: cl_command_queue_properties,
        errcode_ret: *mut cl_int
    ) -> cl_command_queue;

    pub fn clCreateBuffer(
        context: cl_context,
        flags: cl_mem_flags,
        size: usize,
        host_ptr: *mut c_void,
        errcode_ret: *mut cl_int
    ) -> cl_mem;

    pub fn clCreateProgramWithSource(
        context: cl_context,
        count: cl_uint,
        strings: *const *const c_char,
        lengths: *const usize,
        errcode_ret: *mut cl_int
    ) -> cl_program;

    pub fn clBuildProgram(
        program: cl_program,
        num_devices: cl_uint,
        device_list: *const cl_device_id,
        options: *const c_char,
        pfn_notify: Option<extern "C" fn()>,
        user_data: *mut c_void
    ) -> cl_int;

    pub fn clGetProgramBuildInfo(
        program: cl_program,
        device: cl_device_id,
        param_name: cl_program_build_info,
        param_value_size: usize,
        param_value: *mut c_void,
        param_value_size_ret: *mut usize
    ) -> cl_int;

    pub fn clCreateKernel(
        program: cl_program,
        kernel_name: *const c_char,
        errcode_ret: *mut cl_int
    ) -> cl_kernel;

    pub fn clSetKernelArg(
        kernel: cl_kernel,
        arg_index: cl_uint,
        arg_size: usize,
        arg_value: *const c_void
    ) -> cl_int;

    pub fn clEnqueueNDRangeKernel(
        command_queue: cl_command_queue,
        kernel: cl_kernel,
        work_dim: cl_uint,
        global_work_offset: *const usize,
        global_work_size: *const usize,
        local_work_size: *const usize,
        num_events_in_wait_list: cl_uint,
        event_wait_list: *const cl_event,
        event: *mut cl_event
    ) -> cl_int;

    pub fn clEnqueueReadBuffer(
        command_queue: cl_command_queue,
        buffer: cl_mem,
        blocking_read: cl_bool,
        offset: usize,
        size: usize,
        ptr: *mut c_void,
        num_events_in_wait_list: cl_uint,
        event_wait_list: *const cl_event,
        event: *mut cl_event
    ) -> cl_int;

    pub fn clReleaseMemObject(memobj: cl_mem) -> cl_int;
    pub fn clReleaseKernel(kernel: cl_kernel) -> cl_int;
    pub fn clReleaseProgram(program: cl_program) -> cl_int;
    pub fn clReleaseCommandQueue(command_queue: cl_command_queue) -> cl_int;
    pub fn clReleaseContext(context: cl_context) -> cl_int;
}

#[cfg(not(opencl_runtime))]
pub use self::missing::*;

/// Заглушки на случай сборки без библиотеки OpenCL
#[cfg(not(opencl_runtime))]
#[allow(non_snake_case, clippy::missing_safety_doc, clippy::too_many_arguments)]
mod missing {
    use super::*;
    use std::ptr;

    unsafe fn fail<T>(errcode_ret: *mut cl_int) -> *mut T {
        if !errcode_ret.is_null() {
            *errcode_ret = CL_INVALID_PLATFORM;
        }
        ptr::null_mut()
    }

    pub unsafe fn clGetPlatformIDs(
        _num_entries: cl_uint,
        _platforms: *mut cl_platform_id,
        num_platforms: *mut cl_uint
    ) -> cl_int {
        if !num_platforms.is_null() {
            *num_platforms = 0;
        }
        CL_PLATFORM_NOT_FOUND_KHR
    }

    pub unsafe fn clGetPlatformInfo(
        _platform: cl_platform_id,
        _param_name: cl_platform_info,
        _param_value_size: usize,
        _param_value: *mut c_void,
        _param_value_size_ret: *mut usize
    ) -> cl_int {
        CL_INVALID_PLATFORM
    }

    pub unsafe fn clGetDeviceIDs(
        _platform: cl_platform_id,
        _device_type: cl_device_type,
        _num_entries: cl_uint,
        _devices: *mut cl_device_id,
        _num_devices: *mut cl_uint
    ) -> cl_int {
        CL_INVALID_PLATFORM
    }

    pub unsafe fn clGetDeviceInfo(
        _device: cl_device_id,
        _param_name: cl_device_info,
        _param_value_size: usize,
        _param_value: *mut c_void,
        _param_value_size_ret: *mut usize
    ) -> cl_int {
        CL_INVALID_PLATFORM
    }

    pub unsafe fn clCreateContext(
        _properties: *const cl_context_properties,
        _num_devices: cl_uint,
        _devices: *const cl_device_id,
        _pfn_notify: Option<extern "C" fn()>,
        _user_data: *mut c_void,
        errcode_ret: *mut cl_int
    ) -> cl_context {
        fail(errcode_ret)
    }

    pub unsafe fn clCreateCommandQueue(
        _context: cl_context,
        _device: cl_device_id,
        _properties: cl_command_queue_properties,
        errcode_ret: *mut cl_int
    ) -> cl_command_queue {
        fail(errcode_ret)
    }

    pub unsafe fn clCreateBuffer(
        _context: cl_context,
        _flags: cl_mem_flags,
        _size: usize,
        _host_ptr: *mut c_void,
        errcode_ret: *mut cl_int
    ) -> cl_mem {
        fail(errcode_ret)
    }

    pub unsafe fn clCreateProgramWithSource(
        _context: cl_context,
        _count: cl_uint,
        _strings: *const *const c_char,
        _lengths: *const usize,
        errcode_ret: *mut cl_int
    ) -> cl_program {
        fail(errcode_ret)
    }

    pub unsafe fn clBuildProgram(
        _program: cl_program,
        _num_devices: cl_uint,
        _device_list: *const cl_device_id,
        _options: *const c_char,
        _pfn_notify: Option<extern "C" fn()>,
        _user_data: *mut c_void
    ) -> cl_int {
        CL_INVALID_PLATFORM
    }

    pub unsafe fn clGetProgramBuildInfo(
        _program: cl_program,
        _device: cl_device_id,
        _param_name: cl_program_build_info,
        _param_value_size: usize,
        _param_value: *mut c_void,
        _param_value_size_ret: *mut usize
    ) -> cl_int {
        CL_INVALID_PLATFORM
    }

    pub unsafe fn clCreateKernel(
        _program: cl_program,
        _kernel_name: *const c_char,
        errcode_ret: *mut cl_int
    ) -> cl_kernel {
        fail(errcode_ret)
    }

    pub unsafe fn clSetKernelArg(
        _kernel: cl_kernel,
        _arg_index: cl_uint,
        _arg_size: usize,
        _arg_value: *const c_void
    ) -> cl_int {
        CL_INVALID_PLATFORM
    }

    pub unsafe fn clEnqueueNDRangeKernel(
        _command_queue: cl_command_queue,
        _kernel: cl_kernel,
        _work_dim: cl_uint,
        _global_work_offset: *const usize,
        _global_work_size: *const usize,
        _local_work_size: *const usize,
        _num_events_in_wait_list: cl_uint,
        _event_wait_list: *const cl_event,
        _event: *mut cl_event
    ) -> cl_int {
        CL_INVALID_PLATFORM
    }

    pub unsafe fn clEnqueueReadBuffer(
        _command_queue: cl_command_queue,
        _buffer: cl_mem,
        _blocking_read: cl_bool,
        _offset: usize,
        _size: usize,
        _ptr: *mut c_void,
        _num_events_in_wait_list: cl_uint,
        _event_wait_list: *const cl_event,
        _event: *mut cl_event
    ) -> cl_int {
        CL_INVALID_PLATFORM
    }

    pub unsafe fn clReleaseMemObject(_memobj: cl_mem) -> cl_int { CL_INVALID_PLATFORM }
    pub unsafe fn clReleaseKernel(_kernel: cl_kernel) -> cl_int { CL_INVALID_PLATFORM }
    pub unsafe fn clReleaseProgram(_program: cl_program) -> cl_int { CL_INVALID_PLATFORM }
    pub unsafe fn clReleaseCommandQueue(_command_queue: cl_command_queue) -> cl_int { CL_INVALID_PLATFORM }
    pub unsafe fn clReleaseContext(_context: cl_context) -> cl_int { CL_INVALID_PLATFORM }
}
