pub mod instrument;

pub use instrument::{HandlerFn, InstrumentLayer, Instrumented};
