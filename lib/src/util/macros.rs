#[doc(hidden)]
#[macro_export]
macro_rules! dict {
    ($($key:expr => $value:expr),* $(,)?) => ({
        #[allow(unused_mut)]
        let mut dict = $crate::value::Dict::new();
        $(dict.insert($key.into(), $value.into());)*
        dict
    });
}

/// Evaluates the block and logs how long it took at `info` level.
#[doc(hidden)]
#[macro_export]
macro_rules! timed {
    ($stage:literal, $($token:tt)*) => ({
        let start = std::time::Instant::now();
        let value = { $($token)* };
        ::tracing::info!(stage = $stage, elapsed_ms = start.elapsed().as_millis() as u64, "stage complete");
        value
    });
}

pub use {dict, timed};
