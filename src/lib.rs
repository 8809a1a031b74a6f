//! Умножение матриц C = A × B на устройстве OpenCL
//!
//! Весь конвейер: выбор платформы и устройства, контекст и очередь команд,
//! буферы устройства, сборка ядра из исходника, запуск и чтение результата.

// Макросы объявлены до модулей, чтобы быть видимыми в них
// Реэкспортируем макросы на уровень крейта
#[macro_use]
mod macros {
    /// Макрос для обработки кодов возврата OpenCL
    #[macro_export]
    macro_rules! cl_check {
        ($expr:expr) => {{
            let code: $crate::opencl::types::cl_int = unsafe { $expr };
            let result: ::std::result::Result<(), $crate::opencl::types::cl_int> =
                if code != $crate::opencl::types::CL_SUCCESS { Err(code) } else { Ok(()) };
            result
        }};
    }

    /// Макрос для функций-конструкторов OpenCL: последний аргумент `errcode_ret`
    /// подставляется сам, нулевой указатель без кода ошибки считается ошибкой
    #[macro_export]
    macro_rules! cl_create {
        ($func:ident($($arg:expr),*)) => {{
            let mut errcode: $crate::opencl::types::cl_int = $crate::opencl::types::CL_SUCCESS;
            let obj = unsafe { $func($($arg,)* &mut errcode) };
            if errcode != $crate::opencl::types::CL_SUCCESS {
                Err(errcode)
            } else if obj.is_null() {
                Err($crate::opencl::types::CL_INVALID_VALUE)
            } else {
                Ok(obj)
            }
        }};
    }
}

pub mod error;
pub mod matrix;
pub mod opencl;
pub mod pipeline;
pub mod utils;

// Реэкспорт основных типов для удобства
pub use error::{MatMulError, Result};
pub use matrix::Matrix;
pub use opencl::{ClApi, OpenCl};
pub use pipeline::{run, run_traced, PipelineConfig, PipelineState, RunReport, RunTrace};
