use wasm_bindgen::JsValue;

/// JS heap figures, in bytes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MemorySample {
    pub heap_limit: f64,
    pub total_heap: f64,
    pub used_heap: f64,
}

/// Whatever the host can tell us about memory use. `top` is the only reader.
pub trait MemoryProbe {
    fn sample(&self) -> Option<MemorySample>;
}

/// Reads the non-standard `performance.memory` object. Only Chromium
/// browsers have it.
pub struct BrowserMemoryProbe;

impl MemoryProbe for BrowserMemoryProbe {
    fn sample(&self) -> Option<MemorySample> {
        let global = js_sys::global();
        let performance = js_sys::Reflect::get(&global, &JsValue::from_str("performance")).ok()?;
        if performance.is_undefined() || performance.is_null() {
            return None;
        }
        let memory = js_sys::Reflect::get(&performance, &JsValue::from_str("memory")).ok()?;
        if memory.is_undefined() || memory.is_null() {
            return None;
        }
        let read = |key: &str| {
            js_sys::Reflect::get(&memory, &JsValue::from_str(key))
                .ok()
                .and_then(|v| v.as_f64())
        };
        Some(MemorySample {
            heap_limit: read("jsHeapSizeLimit")?,
            total_heap: read("totalJSHeapSize")?,
            used_heap: read("usedJSHeapSize")?,
        })
    }
}

/// fixed numbers, or none at all - tests and the native repl
pub struct StaticMemoryProbe(pub Option<MemorySample>);

impl MemoryProbe for StaticMemoryProbe {
    fn sample(&self) -> Option<MemorySample> {
        self.0
    }
}
