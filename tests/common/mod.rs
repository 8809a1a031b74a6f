//! Поддельный бэкенд OpenCL для тестов конвейера
//!
//! Считает создания и освобождения дескрипторов, ведет журнал вызовов,
//! умеет отказывать на заданном вызове и исполняет "ядро" замыканием на хосте.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::c_void;
use std::mem;

use opencl_matmul::opencl::types::*;
use opencl_matmul::opencl::{ClApi, KernelArg};

/// Исходник, который складывает A и B поэлементно, проходя все элементы с шагом в размер сетки
pub const ADD_KERNEL_SOURCE: &str = r#"
__kernel void matrixMul(__global float* C,
                        __global const float* A,
                        __global const float* B,
                        const int wA,
                        const int wC)
{
    const size_t n = (size_t)wA * (size_t)wC;
    const size_t stride = get_global_size(0) * get_global_size(1);
    for (size_t i = get_global_id(1) * get_global_size(0) + get_global_id(0); i < n; i += stride) {
        C[i] = A[i] + B[i];
    }
}
"#;

/// Хостовая версия `ADD_KERNEL_SOURCE`
pub fn elementwise_add(launch: &mut Launch<'_>) {
    let n = launch.inner_dim as usize * launch.out_width as usize;
    let stride = launch.global[0] * launch.global[1];
    for y in 0..launch.global[1] {
        for x in 0..launch.global[0] {
            let mut i = y * launch.global[0] + x;
            while i < n {
                launch.c[i] = launch.a[i] + launch.b[i];
                i += stride;
            }
        }
    }
}

/// Хостовая версия `src/matmul_kernel.cl`: каждый рабочий элемент сетки
/// проходит строки и столбцы C с шагом в глобальный размер
pub fn strided_matmul(launch: &mut Launch<'_>) {
    let w_a = launch.inner_dim as usize;
    let w_c = launch.out_width as usize;
    let [stride_x, stride_y] = launch.global;

    // Порядок обхода не влияет на результат: каждый элемент C пишется одним рабочим элементом
    for x in 0..stride_x {
        let mut col = x;
        while col < w_c {
            let column: Vec<f32> = launch.b[col..].iter().step_by(w_c).take(w_a).copied().collect();
            for y in 0..stride_y {
                let mut row = y;
                while row < w_a {
                    let a_row = &launch.a[row * w_a..(row + 1) * w_a];
                    launch.c[row * w_c + col] = a_row.iter().zip(&column).map(|(a, b)| a * b).sum();
                    row += stride_y;
                }
            }
            col += stride_x;
        }
    }
}

/// Данные одного запуска ядра
pub struct Launch<'a> {
    pub c: &'a mut [f32],
    pub a: &'a [f32],
    pub b: &'a [f32],
    pub inner_dim: cl_int,
    pub out_width: cl_int,
    pub global: [usize; 2],
    pub local: [usize; 2],
}

type Compute = Box<dyn Fn(&mut Launch<'_>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Context,
    Queue,
    Buffer,
    Program,
    Kernel,
}

#[derive(Default)]
struct State {
    next_handle: usize,
    live: HashMap<usize, (Kind, String)>,
    created: HashMap<Kind, usize>,
    released: HashMap<Kind, usize>,
    invalid_releases: usize,
    release_order: Vec<String>,
    calls: Vec<String>,
    buffers: HashMap<usize, Vec<f32>>,
    sources: HashMap<usize, String>,
    args: HashMap<u32, KernelArg>,
}

pub struct MockCl {
    platforms: Vec<String>,
    failures: HashMap<&'static str, cl_int>,
    buffer_failure: Option<(usize, cl_int)>,
    arg_failure: Option<(u32, cl_int)>,
    empty_build_log: bool,
    compute: Option<Compute>,
    state: RefCell<State>,
}

const PLATFORM_BASE: usize = 0x1000;
const DEVICE_BASE: usize = 0x2000;

impl MockCl {
    pub fn new(platforms: &[&str]) -> Self {
        Self {
            platforms: platforms.iter().map(|p| p.to_string()).collect(),
            failures: HashMap::new(),
            buffer_failure: None,
            arg_failure: None,
            empty_build_log: false,
            compute: None,
            state: RefCell::new(State { next_handle: 1, ..State::default() }),
        }
    }

    /// Вызов `call` вернет `code`
    pub fn failing(mut self, call: &'static str, code: cl_int) -> Self {
        self.failures.insert(call, code);
        self
    }

    /// `nth` по счету (с нуля) `clCreateBuffer` вернет `code`
    pub fn failing_buffer(mut self, nth: usize, code: cl_int) -> Self {
        self.buffer_failure = Some((nth, code));
        self
    }

    pub fn failing_arg(mut self, index: u32, code: cl_int) -> Self {
        self.arg_failure = Some((index, code));
        self
    }

    pub fn with_empty_build_log(mut self) -> Self {
        self.empty_build_log = true;
        self
    }

    pub fn with_compute<F>(mut self, compute: F) -> Self
    where
        F: Fn(&mut Launch<'_>) + 'static,
    {
        self.compute = Some(Box::new(compute));
        self
    }

    pub fn created(&self, kind: Kind) -> usize {
        self.state.borrow().created.get(&kind).copied().unwrap_or(0)
    }

    pub fn released(&self, kind: Kind) -> usize {
        self.state.borrow().released.get(&kind).copied().unwrap_or(0)
    }

    /// Все созданные дескрипторы освобождены ровно по одному разу
    pub fn assert_balanced(&self) {
        let state = self.state.borrow();
        for kind in [Kind::Context, Kind::Queue, Kind::Buffer, Kind::Program, Kind::Kernel] {
            assert_eq!(
                state.created.get(&kind).copied().unwrap_or(0),
                state.released.get(&kind).copied().unwrap_or(0),
                "несбалансированы {:?}",
                kind
            );
        }
        assert!(state.live.is_empty(), "остались дескрипторы: {:?}", state.live);
        assert_eq!(state.invalid_releases, 0);
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    pub fn called(&self, prefix: &str) -> bool {
        self.state.borrow().calls.iter().any(|c| c.starts_with(prefix))
    }

    pub fn release_order(&self) -> Vec<String> {
        self.state.borrow().release_order.clone()
    }

    fn record(&self, call: String) {
        self.state.borrow_mut().calls.push(call);
    }

    fn check(&self, call: &'static str) -> Result<(), cl_int> {
        match self.failures.get(call) {
            Some(&code) => Err(code),
            None => Ok(()),
        }
    }

    fn acquire(&self, kind: Kind, label: String) -> *mut c_void {
        let mut state = self.state.borrow_mut();
        let handle = state.next_handle;
        state.next_handle += 1;
        state.live.insert(handle, (kind, label));
        *state.created.entry(kind).or_insert(0) += 1;
        handle as *mut c_void
    }

    fn release(&self, kind: Kind, raw: *mut c_void) -> cl_int {
        let mut state = self.state.borrow_mut();
        let handle = raw as usize;
        match state.live.remove(&handle) {
            Some((live_kind, label)) if live_kind == kind => {
                *state.released.entry(kind).or_insert(0) += 1;
                state.release_order.push(label);
                state.buffers.remove(&handle);
                CL_SUCCESS
            }
            Some(other) => {
                state.live.insert(handle, other);
                state.invalid_releases += 1;
                CL_INVALID_VALUE
            }
            None => {
                state.invalid_releases += 1;
                CL_INVALID_VALUE
            }
        }
    }

    fn buffer_arg(&self, index: u32) -> Option<usize> {
        match self.state.borrow().args.get(&index) {
            Some(KernelArg::Buffer(raw)) => Some(*raw as usize),
            _ => None,
        }
    }

    fn int_arg(&self, index: u32) -> Option<cl_int> {
        match self.state.borrow().args.get(&index) {
            Some(KernelArg::Int(value)) => Some(*value),
            _ => None,
        }
    }
}

impl ClApi for MockCl {
    fn platform_ids(&self, max_entries: cl_uint) -> Result<Vec<cl_platform_id>, cl_int> {
        self.record("clGetPlatformIDs".into());
        self.check("clGetPlatformIDs")?;
        Ok((0..self.platforms.len().min(max_entries as usize))
            .map(|i| (PLATFORM_BASE + i) as cl_platform_id)
            .collect())
    }

    fn platform_name(&self, platform: cl_platform_id) -> Result<String, cl_int> {
        self.record("clGetPlatformInfo".into());
        self.check("clGetPlatformInfo")?;
        self.platforms
            .get((platform as usize).wrapping_sub(PLATFORM_BASE))
            .cloned()
            .ok_or(CL_INVALID_PLATFORM)
    }

    fn default_device(&self, platform: cl_platform_id) -> Result<cl_device_id, cl_int> {
        let index = (platform as usize).wrapping_sub(PLATFORM_BASE);
        self.record(format!("clGetDeviceIDs({})", index));
        self.check("clGetDeviceIDs")?;
        Ok((DEVICE_BASE + index) as cl_device_id)
    }

    fn device_name(&self, device: cl_device_id) -> Result<String, cl_int> {
        self.record("clGetDeviceInfo".into());
        self.check("clGetDeviceInfo")?;
        Ok(format!("Mock Device {}", (device as usize) - DEVICE_BASE))
    }

    fn create_context(&self, _device: cl_device_id) -> Result<cl_context, cl_int> {
        self.record("clCreateContext".into());
        self.check("clCreateContext")?;
        Ok(self.acquire(Kind::Context, "context".into()))
    }

    fn create_command_queue(
        &self,
        _context: cl_context,
        _device: cl_device_id,
    ) -> Result<cl_command_queue, cl_int> {
        self.record("clCreateCommandQueue".into());
        self.check("clCreateCommandQueue")?;
        Ok(self.acquire(Kind::Queue, "queue".into()))
    }

    fn create_buffer(
        &self,
        _context: cl_context,
        flags: cl_mem_flags,
        size: usize,
        host_data: Option<&[f32]>,
    ) -> Result<cl_mem, cl_int> {
        let nth = self.created(Kind::Buffer);
        self.record(format!("clCreateBuffer({})", nth));
        if let Some((fail_at, code)) = self.buffer_failure {
            if fail_at == nth {
                return Err(code);
            }
        }

        let len = size / mem::size_of::<f32>();
        let data = match host_data {
            Some(data) => {
                assert!(flags & CL_MEM_COPY_HOST_PTR != 0, "данные хоста без CL_MEM_COPY_HOST_PTR");
                data[..len].to_vec()
            }
            None => vec![0.0; len],
        };
        let raw = self.acquire(Kind::Buffer, format!("buffer{}", nth));
        self.state.borrow_mut().buffers.insert(raw as usize, data);
        Ok(raw)
    }

    fn create_program(&self, _context: cl_context, source: &str) -> Result<cl_program, cl_int> {
        self.record("clCreateProgramWithSource".into());
        self.check("clCreateProgramWithSource")?;
        let raw = self.acquire(Kind::Program, "program".into());
        self.state.borrow_mut().sources.insert(raw as usize, source.to_string());
        Ok(raw)
    }

    fn build_program(&self, program: cl_program, _device: cl_device_id) -> Result<(), cl_int> {
        self.record("clBuildProgram".into());
        let state = self.state.borrow();
        let source = state.sources.get(&(program as usize)).ok_or(CL_INVALID_VALUE)?;
        if source.contains("#error") {
            return Err(CL_BUILD_PROGRAM_FAILURE);
        }
        Ok(())
    }

    fn build_log(&self, program: cl_program, _device: cl_device_id) -> Result<String, cl_int> {
        self.record("clGetProgramBuildInfo".into());
        if self.empty_build_log {
            return Ok(String::new());
        }
        let state = self.state.borrow();
        let source = state.sources.get(&(program as usize)).ok_or(CL_INVALID_VALUE)?;
        Ok(source
            .lines()
            .enumerate()
            .filter(|(_, line)| line.contains("#error"))
            .map(|(n, line)| format!("<kernel>:{}:1: error: {}", n + 1, line.trim()))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn create_kernel(&self, program: cl_program, name: &str) -> Result<cl_kernel, cl_int> {
        self.record(format!("clCreateKernel({})", name));
        let defined = self
            .state
            .borrow()
            .sources
            .get(&(program as usize))
            .map(|source| source.contains(&format!("__kernel void {}(", name)))
            .unwrap_or(false);
        if !defined {
            return Err(CL_INVALID_KERNEL_NAME);
        }
        Ok(self.acquire(Kind::Kernel, "kernel".into()))
    }

    fn set_kernel_arg(&self, _kernel: cl_kernel, index: cl_uint, arg: KernelArg) -> Result<(), cl_int> {
        self.record(format!("clSetKernelArg({})", index));
        if let Some((fail_at, code)) = self.arg_failure {
            if fail_at == index {
                return Err(code);
            }
        }
        if index > 4 {
            return Err(CL_INVALID_ARG_INDEX);
        }
        self.state.borrow_mut().args.insert(index, arg);
        Ok(())
    }

    fn enqueue_kernel(
        &self,
        _queue: cl_command_queue,
        _kernel: cl_kernel,
        global: [usize; 2],
        local: [usize; 2],
    ) -> Result<(), cl_int> {
        self.record(format!("clEnqueueNDRangeKernel({:?}, {:?})", global, local));
        self.check("clEnqueueNDRangeKernel")?;
        if (0..2).any(|d| local[d] == 0 || global[d] % local[d] != 0) {
            return Err(CL_INVALID_WORK_GROUP_SIZE);
        }

        let Some(compute) = &self.compute else {
            return Ok(());
        };
        let (c, a, b) = match (self.buffer_arg(0), self.buffer_arg(1), self.buffer_arg(2)) {
            (Some(c), Some(a), Some(b)) => (c, a, b),
            _ => return Err(CL_INVALID_VALUE),
        };
        let inner_dim = self.int_arg(3).ok_or(CL_INVALID_VALUE)?;
        let out_width = self.int_arg(4).ok_or(CL_INVALID_VALUE)?;

        let mut state = self.state.borrow_mut();
        let a = state.buffers.get(&a).cloned().ok_or(CL_INVALID_VALUE)?;
        let b = state.buffers.get(&b).cloned().ok_or(CL_INVALID_VALUE)?;
        let c = state.buffers.get_mut(&c).ok_or(CL_INVALID_VALUE)?;
        compute(&mut Launch {
            c: c.as_mut_slice(),
            a: a.as_slice(),
            b: b.as_slice(),
            inner_dim,
            out_width,
            global,
            local,
        });
        Ok(())
    }

    fn read_buffer(
        &self,
        _queue: cl_command_queue,
        buffer: cl_mem,
        out: &mut [f32],
    ) -> Result<(), cl_int> {
        self.record("clEnqueueReadBuffer".into());
        self.check("clEnqueueReadBuffer")?;
        let state = self.state.borrow();
        let data = state.buffers.get(&(buffer as usize)).ok_or(CL_INVALID_VALUE)?;
        if data.len() != out.len() {
            return Err(CL_INVALID_VALUE);
        }
        out.copy_from_slice(data);
        Ok(())
    }

    fn release_mem_object(&self, buffer: cl_mem) -> cl_int {
        self.release(Kind::Buffer, buffer)
    }

    fn release_kernel(&self, kernel: cl_kernel) -> cl_int {
        self.release(Kind::Kernel, kernel)
    }

    fn release_program(&self, program: cl_program) -> cl_int {
        self.release(Kind::Program, program)
    }

    fn release_command_queue(&self, queue: cl_command_queue) -> cl_int {
        self.release(Kind::Queue, queue)
    }

    fn release_context(&self, context: cl_context) -> cl_int {
        self.release(Kind::Context, context)
    }
}
