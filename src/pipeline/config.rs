//! Настройки конвейера

use std::env;
use std::path::PathBuf;

use super::builder::DEFAULT_KERNEL_PATH;

/// Включает вывод матриц A, B и C на консоль
pub const PRINT_MATRICES_ENV: &str = "MATMUL_PRINT_MATRICES";
/// Включает проверку результата на CPU
pub const VERIFY_ENV: &str = "MATMUL_VERIFY";

/// Зерно генератора входных матриц
pub const DEFAULT_SEED: u64 = 2006;
/// Платформа, которую выбираем только при отсутствии других
pub const DEFAULT_EXCLUDED_VENDOR: &str = "AMD Accelerated Parallel Processing";

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub print_matrices: bool,
    pub verify: bool,
    pub seed: u64,
    pub kernel_path: PathBuf,
    pub excluded_vendor: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            print_matrices: false,
            verify: true,
            seed: DEFAULT_SEED,
            kernel_path: PathBuf::from(DEFAULT_KERNEL_PATH),
            excluded_vendor: DEFAULT_EXCLUDED_VENDOR.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Настройки по умолчанию с переключателями из переменных окружения
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| env::var(key).ok())
    }

    /// Применяет переключатели, найденные через `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(flag) = read_flag(&lookup, PRINT_MATRICES_ENV) {
            self.print_matrices = flag;
        }
        if let Some(flag) = read_flag(&lookup, VERIFY_ENV) {
            self.verify = flag;
        }
        self
    }
}

fn read_flag<F>(lookup: &F, key: &str) -> Option<bool>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key)?;
    let flag = parse_flag(&value);
    if flag.is_none() {
        tracing::warn!(key, value = %value, "Непонятное значение переключателя, оставляем по умолчанию");
    }
    flag
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
