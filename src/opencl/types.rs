//! OpenCL типы данных

#[allow(non_camel_case_types)]
pub type cl_platform_id = *mut std::ffi::c_void;
#[allow(non_camel_case_types)]
pub type cl_device_id = *mut std::ffi::c_void;
#[allow(non_camel_case_types)]
pub type cl_context = *mut std::ffi::c_void;
#[allow(non_camel_case_types)]
pub type cl_command_queue = *mut std::ffi::c_void;
#[allow(non_camel_case_types)]
pub type cl_program = *mut std::ffi::c_void;
#[allow(non_camel_case_types)]
pub type cl_kernel = *mut std::ffi::c_void;
#[allow(non_camel_case_types)]
pub type cl_mem = *mut std::ffi::c_void;
#[allow(non_camel_case_types)]
pub type cl_event = *mut std::ffi::c_void;
#[allow(non_camel_case_types)]
pub type cl_platform_info = u32;
#[allow(non_camel_case_types)]
pub type cl_device_info = u32;
#[allow(non_camel_case_types)]
pub type cl_device_type = u64;
#[allow(non_camel_case_types)]
pub type cl_int = i32;
#[allow(non_camel_case_types)]
pub type cl_uint = u32;
#[allow(non_camel_case_types)]
pub type cl_bool = u32;
#[allow(non_camel_case_types)]
pub type cl_context_properties = isize;
#[allow(non_camel_case_types)]
pub type cl_command_queue_properties = u64;
#[allow(non_camel_case_types)]
pub type cl_mem_flags = u64;
#[allow(non_camel_case_types)]
pub type cl_program_build_info = u32;

// Коды возврата
pub const CL_SUCCESS: cl_int = 0;
pub const CL_DEVICE_NOT_FOUND: cl_int = -1;
pub const CL_OUT_OF_RESOURCES: cl_int = -5;
pub const CL_BUILD_PROGRAM_FAILURE: cl_int = -11;
pub const CL_INVALID_VALUE: cl_int = -30;
pub const CL_INVALID_PLATFORM: cl_int = -32;
pub const CL_INVALID_KERNEL_NAME: cl_int = -46;
pub const CL_INVALID_ARG_INDEX: cl_int = -49;
pub const CL_INVALID_WORK_GROUP_SIZE: cl_int = -54;
pub const CL_PLATFORM_NOT_FOUND_KHR: cl_int = -1001;

pub const CL_TRUE: cl_bool = 1;

// Константы OpenCL
pub const CL_PLATFORM_NAME: cl_platform_info = 0x0902;
pub const CL_DEVICE_NAME: cl_device_info = 0x102B;
pub const CL_DEVICE_TYPE_DEFAULT: cl_device_type = 1 << 0;
pub const CL_MEM_READ_WRITE: cl_mem_flags = 1 << 0;
pub const CL_MEM_COPY_HOST_PTR: cl_mem_flags = 1 << 5;
pub const CL_PROGRAM_BUILD_LOG: cl_program_build_info = 0x1183;
