//! Вспомогательные функции для OpenCL

use std::ffi::CString;

use super::types::{cl_int, CL_INVALID_VALUE};

/// Преобразует строку в null-terminated строку для C
pub fn to_c_string(s: &str) -> Result<CString, cl_int> {
    CString::new(s).map_err(|_| CL_INVALID_VALUE)
}

/// Превращает буфер `clGet*Info` в строку, отбрасывая завершающий ноль
pub fn info_to_string(mut bytes: Vec<u8>) -> String {
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    String::from_utf8_lossy(&bytes).into_owned()
}
