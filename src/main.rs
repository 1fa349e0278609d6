use fixed_pool::ThreadPool;
use std::{process, time::Instant};
use tracing_subscriber::EnvFilter;


fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let now = Instant::now();
    let pool = ThreadPool::new(4)?;

    let mut results = Vec::with_capacity(8);
    for _ in 0..8 {
        results.push(pool.submit(|| {
            let pid = process::id();
            println!("PID is : {}", pid);
            pid
        })?);
    }

    for handle in results {
        let _pid = handle.get()?;
    }

    pool.shutdown();
    println!("elapsed: {:?}", now.elapsed());
    Ok(())
}
