#[macro_export]
macro_rules! iter_if_parallel {
    ($collection:expr) => {{
        #[cfg(feature = "parallel")]
        let iter = $collection.par_iter();
        #[cfg(not(feature = "parallel"))]
        let iter = $collection.iter();
        iter
    }};
}
