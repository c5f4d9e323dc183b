use rayon::prelude::*;

pub fn into_par_iter<T>(v: impl IntoParallelIterator<Item = T>) -> impl ParallelIterator<Item = T> {
    v.into_par_iter()
}

/**
 * Evaluates `f(0..n)` on the thread pool and collects the results in index order.
 *
 * If several evaluations fail, the error of the lowest index is returned, so failures
 * are reported the same way regardless of scheduling.
 */
pub fn par_map_collect<T: Send, E: Send, F: Fn(usize) -> Result<T, E> + Send + Sync>(
    n: usize,
    f: F,
) -> Result<Vec<T>, E> {
    let results: Vec<Result<T, E>> = into_par_iter(0..n).map(f).collect();
    results.into_iter().collect()
}

#[test]
fn par_map_collect_keeps_order_and_first_error() {
    let squares: Result<Vec<usize>, usize> = par_map_collect(1000, |i| Ok(i * i));
    assert_eq!(squares.unwrap()[999], 999 * 999);

    let failed: Result<Vec<usize>, usize> = par_map_collect(1000, |i| if i % 100 == 37 { Err(i) } else { Ok(i) });
    assert_eq!(failed, Err(37));
}
