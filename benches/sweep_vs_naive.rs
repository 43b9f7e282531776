use criterion::{criterion_group, criterion_main, Criterion};
use planar_overlay::algorithms::intersection::naive;
use planar_overlay::algorithms::find_intersections;
use planar_overlay::data::{Point, Segment};

use rand::Rng;
use rand::SeedableRng;

fn random_segments(n: usize, seed: u64) -> Vec<Segment> {
  let mut rng = rand::rngs::SmallRng::seed_from_u64(seed);
  let mut segments = Vec::with_capacity(n);
  while segments.len() < n {
    let x1 = rng.gen_range(-10_000..10_000);
    let y1 = rng.gen_range(-10_000..10_000);
    let x2 = rng.gen_range(-10_000..10_000);
    let y2 = rng.gen_range(-10_000..10_000);
    if (x1, y1) == (x2, y2) {
      continue;
    }
    segments.push(Segment::new(Point::new(x1, y1), Point::new(x2, y2)));
  }
  segments
}

pub fn criterion_benchmark(c: &mut Criterion) {
  for &n in &[10usize, 100, 500] {
    let segments = random_segments(n, 1);
    c.bench_function(&format!("sweep({n})"), |b| b.iter(|| find_intersections(&segments)));
    c.bench_function(&format!("naive({n})"), |b| b.iter(|| naive::segment_intersections(&segments)));
  }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
