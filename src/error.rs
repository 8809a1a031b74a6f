//! Ошибки конвейера умножения матриц

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::opencl::types::cl_int;

/// Код завершения процесса при любой фатальной ошибке
pub const EXIT_FAILURE: u8 = 1;

/// Все ошибки конвейера фатальны: повторов и запасных устройств нет
#[derive(Error, Debug)]
pub enum MatMulError {
    #[error("платформа OpenCL не найдена")]
    NoPlatform,

    #[error("{call}: код ошибки {code}")]
    Api { call: &'static str, code: cl_int },

    /// Журнал сборки уже выведен в лог при ошибке и хранится в `log`
    #[error("clBuildProgram: код ошибки {code}")]
    Build { code: cl_int, log: String },

    #[error("не удалось загрузить ядро из {}: {source}", path.display())]
    KernelSource {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("clSetKernelArg, аргумент {index}: код ошибки {code}")]
    KernelArg { index: u32, code: cl_int },

    #[error("clEnqueueNDRangeKernel: код ошибки {code}")]
    Dispatch { code: cl_int },

    #[error("clEnqueueReadBuffer: код ошибки {code}")]
    ReadBack { code: cl_int },

    #[error("некорректная геометрия запуска: global {global:?}, local {local:?}")]
    Geometry { global: [usize; 2], local: [usize; 2] },

    #[error("результат расходится с CPU: {mismatches} элементов, максимальная разница {max_diff}")]
    Verification { mismatches: usize, max_diff: f32 },
}

impl MatMulError {
    pub fn api(call: &'static str, code: cl_int) -> Self {
        Self::Api { call, code }
    }

    /// Код завершения процесса для этой ошибки
    pub fn exit_code(&self) -> u8 {
        EXIT_FAILURE
    }
}

pub type Result<T> = std::result::Result<T, MatMulError>;
