use climo::{
    build_fixed_windows, DailyObservation, MonthlyAggregator, RecordBuckets, Variable, WindowConfig,
};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn synthetic_history(years: std::ops::RangeInclusive<i32>) -> Vec<DailyObservation> {
    let mut observations = Vec::new();
    for year in years {
        for month in 1..=12u32 {
            for day in 1..=28u32 {
                let seasonal = (f64::from(month) - 6.5).abs();
                let noise = f64::from((year as u32 * 31 + month * 7 + day) % 17) / 4.0;
                observations.push(
                    DailyObservation::new(format!("{year}-{month:02}-{day:02}"))
                        .with(Variable::TemperatureMax, 28.0 - 3.0 * seasonal + noise)
                        .with(Variable::TemperatureMin, 14.0 - 3.0 * seasonal - noise)
                        .with(Variable::TemperatureMean, 21.0 - 3.0 * seasonal)
                        .with(Variable::PrecipitationSum, if day % 3 == 0 { noise } else { 0.0 })
                        .with(Variable::HumidityMean, 70.0 + noise),
                );
            }
        }
    }
    observations
}

fn bench_climatology(c: &mut Criterion) {
    let observations = synthetic_history(1961..=2020);
    let aggregator = MonthlyAggregator::default();
    let aggregates = aggregator.aggregate_months(&observations);

    c.bench_function("aggregate_months_60y", |b| {
        b.iter(|| aggregator.aggregate_months(black_box(&observations)))
    });
    c.bench_function("record_buckets_60y", |b| {
        b.iter(|| RecordBuckets::new().accumulate(black_box(&observations)).reduce())
    });
    c.bench_function("fixed_windows_60y", |b| {
        b.iter(|| build_fixed_windows(black_box(&aggregates), &WindowConfig::default(), None))
    });
}

criterion_group!(benches, bench_climatology);
criterion_main!(benches);
