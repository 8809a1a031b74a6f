// build.rs: ищет библиотеку OpenCL и включает cfg `opencl_runtime`.
//
// Без библиотеки крейт собирается с заглушками вместо привязок: программа
// сообщает, что платформа не найдена, а тесты на mock-бэкенде линкуются.

use std::env;
use std::path::{Path, PathBuf};

const LINUX_LIB_DIRS: &[&str] = &[
    "/usr/lib",
    "/usr/lib64",
    "/usr/lib/x86_64-linux-gnu",
    "/usr/lib/aarch64-linux-gnu",
    "/usr/local/lib",
    "/opt/rocm/lib",
    "/usr/local/cuda/lib64",
];

fn find_library(dirs: &[PathBuf], file_name: &str) -> Option<PathBuf> {
    dirs.iter().find(|dir| dir.join(file_name).exists()).cloned()
}

fn main() {
    println!("cargo:rerun-if-env-changed=OPENCL_LIB_DIR");
    println!("cargo:rustc-check-cfg=cfg(opencl_runtime)");

    let target_os = env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os == "macos" {
        println!("cargo:rustc-link-lib=framework=OpenCL");
        println!("cargo:rustc-cfg=opencl_runtime");
        return;
    }

    let mut dirs: Vec<PathBuf> = Vec::new();
    if let Ok(dir) = env::var("OPENCL_LIB_DIR") {
        dirs.push(PathBuf::from(dir));
    }
    if let Ok(cuda) = env::var("CUDA_PATH") {
        dirs.push(Path::new(&cuda).join("lib").join("x64"));
    }
    dirs.extend(LINUX_LIB_DIRS.iter().map(PathBuf::from));

    let file_name = if target_os == "windows" { "OpenCL.lib" } else { "libOpenCL.so" };
    match find_library(&dirs, file_name) {
        Some(dir) => {
            println!("cargo:rustc-link-search=native={}", dir.display());
            println!("cargo:rustc-link-lib=dylib=OpenCL");
            println!("cargo:rustc-cfg=opencl_runtime");
        }
        None => {
            println!(
                "cargo:warning={} не найдена; сборка без OpenCL (задайте OPENCL_LIB_DIR)",
                file_name
            );
        }
    }
}
