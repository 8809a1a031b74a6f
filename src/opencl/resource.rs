//! Владеющие обертки над дескрипторами OpenCL
//!
//! Каждая обертка освобождает свой дескриптор ровно один раз в `Drop`.
//! Дескриптор, который так и не был создан, обертки не имеет и не освобождается.

use super::api::ClApi;
use super::types::*;

macro_rules! cl_resource {
    ($(#[$meta:meta])* $name:ident, $raw:ty, $release:ident, $label:literal) => {
        $(#[$meta])*
        pub struct $name<'a, A: ClApi + ?Sized> {
            api: &'a A,
            raw: $raw,
        }

        impl<'a, A: ClApi + ?Sized> $name<'a, A> {
            /// Принимает владение уже созданным дескриптором
            pub fn from_raw(api: &'a A, raw: $raw) -> Self {
                Self { api, raw }
            }

            pub fn as_raw(&self) -> $raw {
                self.raw
            }
        }

        impl<A: ClApi + ?Sized> std::fmt::Debug for $name<'_, A> {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($name)).field(&self.raw).finish()
            }
        }

        impl<A: ClApi + ?Sized> Drop for $name<'_, A> {
            fn drop(&mut self) {
                let code = self.api.$release(self.raw);
                if code != CL_SUCCESS {
                    tracing::warn!(code, "Не удалось освободить {}", $label);
                } else {
                    tracing::trace!("Освобожден {}", $label);
                }
            }
        }
    };
}

cl_resource!(
    /// Контекст выполнения для одного устройства
    Context, cl_context, release_context, "контекст"
);

cl_resource!(
    /// Упорядоченная очередь команд
    CommandQueue, cl_command_queue, release_command_queue, "очередь команд"
);

cl_resource!(
    /// Буфер в памяти устройства
    DeviceBuffer, cl_mem, release_mem_object, "буфер устройства"
);

cl_resource!(
    /// Программа, собранная из исходного текста
    Program, cl_program, release_program, "программа"
);

cl_resource!(Kernel, cl_kernel, release_kernel, "ядро");
