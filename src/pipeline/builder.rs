//! Загрузка исходника ядра, сборка программы, извлечение ядра

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use tracing::{error, info, warn};

use crate::error::{MatMulError, Result};
use crate::opencl::types::cl_device_id;
use crate::opencl::{ClApi, Context, Kernel, Program};

/// Путь к исходнику ядра относительно рабочего каталога
pub const DEFAULT_KERNEL_PATH: &str = "src/matmul_kernel.cl";
/// Точка входа, которую должен содержать исходник
pub const KERNEL_ENTRY_POINT: &str = "matrixMul";
/// Больше этого из файла не читается
pub const MAX_SOURCE_SIZE: u64 = 0x100000;

/// Читает исходник ядра целиком, но не больше `MAX_SOURCE_SIZE` байт
pub fn load_source(path: &Path) -> Result<String> {
    let source_error = |source: io::Error| MatMulError::KernelSource {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(source_error)?;
    let mut bytes = Vec::new();
    // Лишний байт отличает файл ровно в MAX_SOURCE_SIZE от более длинного
    file.take(MAX_SOURCE_SIZE + 1)
        .read_to_end(&mut bytes)
        .map_err(source_error)?;
    if bytes.len() as u64 > MAX_SOURCE_SIZE {
        warn!(path = %path.display(), "Исходник ядра обрезан до {} байт", MAX_SOURCE_SIZE);
        bytes.truncate(MAX_SOURCE_SIZE as usize);
    }

    String::from_utf8(bytes).map_err(|err| source_error(io::Error::new(io::ErrorKind::InvalidData, err)))
}

/// Собирает программу из исходника для выбранного устройства.
///
/// При ошибке сборки журнал компилятора выводится в лог и попадает в
/// [`MatMulError::Build`]; пустой журнал заменяется пояснением.
pub fn build_program<'a, A: ClApi + ?Sized>(
    api: &'a A,
    context: &Context<'a, A>,
    device: cl_device_id,
    source: &str,
) -> Result<Program<'a, A>> {
    let program = api
        .create_program(context.as_raw(), source)
        .map(|raw| Program::from_raw(api, raw))
        .map_err(|code| MatMulError::api("clCreateProgramWithSource", code))?;

    info!("Сборка программы");
    if let Err(code) = api.build_program(program.as_raw(), device) {
        let log = match api.build_log(program.as_raw(), device) {
            Ok(log) if !log.trim().is_empty() => log,
            Ok(_) => format!("<журнал сборки пуст, код ошибки {}>", code),
            Err(log_code) => format!(
                "<журнал сборки недоступен: код {}, код ошибки сборки {}>",
                log_code, code
            ),
        };
        error!(code, "Ошибка при компиляции программы:\n{}", log);
        return Err(MatMulError::Build { code, log });
    }
    info!("Программа собрана");

    Ok(program)
}

/// Извлекает из собранной программы ядро с именем `name`
pub fn create_kernel<'a, A: ClApi + ?Sized>(
    api: &'a A,
    program: &Program<'a, A>,
    name: &str,
) -> Result<Kernel<'a, A>> {
    api.create_kernel(program.as_raw(), name)
        .map(|raw| Kernel::from_raw(api, raw))
        .map_err(|code| MatMulError::api("clCreateKernel", code))
}
