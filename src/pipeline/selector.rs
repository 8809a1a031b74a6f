//! Выбор платформы и устройства

use prettytable::{row, Table};
use tracing::{info, warn};

use crate::error::{MatMulError, Result};
use crate::opencl::types::{cl_device_id, cl_platform_id, cl_uint};
use crate::opencl::ClApi;

/// Сколько платформ запрашиваем у драйвера
pub const MAX_PLATFORMS: cl_uint = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct PlatformInfo {
    pub id: cl_platform_id,
    pub name: String,
}

/// Устройство, на котором пойдут вычисления
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedDevice {
    pub platform_name: String,
    pub device: cl_device_id,
    pub device_name: String,
}

/// Перечисляет платформы и их имена. Пустой список это `NoPlatform`.
pub fn enumerate_platforms<A: ClApi + ?Sized>(api: &A) -> Result<Vec<PlatformInfo>> {
    let ids = api
        .platform_ids(MAX_PLATFORMS)
        .map_err(|code| MatMulError::api("clGetPlatformIDs", code))?;
    if ids.is_empty() {
        return Err(MatMulError::NoPlatform);
    }

    info!("Получение списка устройств...");
    ids.into_iter()
        .map(|id| {
            let name = api
                .platform_name(id)
                .map_err(|code| MatMulError::api("clGetPlatformInfo", code))?;
            Ok(PlatformInfo { id, name })
        })
        .collect()
}

/// Первая платформа, не совпадающая по имени с `excluded`.
/// Если других нет, берется исключенная; `None` только для пустого списка.
pub fn choose_platform<'p>(platforms: &'p [PlatformInfo], excluded: &str) -> Option<&'p PlatformInfo> {
    platforms
        .iter()
        .find(|p| p.name != excluded)
        .or_else(|| platforms.first())
}

/// Выбирает платформу и запрашивает у нее одно устройство по умолчанию
pub fn select_device<A: ClApi + ?Sized>(
    api: &A,
    platforms: &[PlatformInfo],
    excluded: &str,
) -> Result<SelectedDevice> {
    let platform = choose_platform(platforms, excluded).ok_or(MatMulError::NoPlatform)?;
    info!("Платформы OpenCL:\n{}", platform_table(platforms, platform));
    if platform.name == excluded {
        warn!(platform = %platform.name, "Других платформ нет, используем исключенную");
    }

    let device = api
        .default_device(platform.id)
        .map_err(|code| MatMulError::api("clGetDeviceIDs", code))?;

    // Имя нужно только для диагностики
    let device_name = api.device_name(device).unwrap_or_else(|code| {
        warn!(code, "Не удалось получить имя устройства");
        String::from("<неизвестное устройство>")
    });
    info!("Выбрано устройство: {}", device_name);

    Ok(SelectedDevice {
        platform_name: platform.name.clone(),
        device,
        device_name,
    })
}

fn platform_table(platforms: &[PlatformInfo], chosen: &PlatformInfo) -> Table {
    let mut table = Table::new();
    table.add_row(row!["№", "Платформа", "Выбрана"]);
    for (index, platform) in platforms.iter().enumerate() {
        let mark = if platform.id == chosen.id { "да" } else { "" };
        table.add_row(row![index, platform.name, mark]);
    }
    table
}
