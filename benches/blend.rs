/// Benchmarks for the blending computation.
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use crude_assay::blend;
use crude_assay::models::{BlendInputs, Category, WholeCrudeRow, YieldRow};
use crude_assay::yields::{WholeCrudeTable, YieldMatrix};
use ndarray::{Array1, Array2};

fn yield_rows(crudes: i64) -> Vec<YieldRow> {
    (1..=crudes)
        .flat_map(|crude_id| {
            Category::ALL.into_iter().map(move |category| YieldRow {
                crude_id,
                name: format!("crude {crude_id}"),
                product_name: category.product_name().to_string(),
                yield_percent: Some((crude_id as f64 + category.index() as f64) % 30.0),
                cut_start: Some(category.index() as f64 * 50.0),
            })
        })
        .collect()
}

fn whole_crude_rows(crudes: i64) -> Vec<WholeCrudeRow> {
    (1..=crudes)
        .map(|crude_id| WholeCrudeRow {
            crude_id,
            name: format!("crude {crude_id}"),
            api: Some(20.0 + (crude_id % 25) as f64),
            sulphur_total: Some(0.1 * (crude_id % 30) as f64),
        })
        .collect()
}

fn criterion_benchmark(c: &mut Criterion) {
    for crudes in [2_i64, 10, 100, 1000] {
        let crude_ids: Vec<i64> = (1..=crudes).collect();
        let volumes: Vec<f64> = (1..=crudes).map(|i| (i * 100) as f64).collect();
        let rows = yield_rows(crudes);
        let whole_rows = whole_crude_rows(crudes);

        let name = format!("pivot({crudes})");
        c.bench_function(&name, |b| {
            b.iter(|| YieldMatrix::from_rows(black_box(&crude_ids), black_box(&rows)).unwrap())
        });

        let values = Array2::<f64>::from_elem((crudes as usize, Category::ALL.len()), 12.5);
        let weights = Array1::from(volumes.clone());
        let name = format!("weighted_average({crudes})");
        c.bench_function(&name, |b| {
            b.iter(|| blend::weighted_average(black_box(values.view()), weights.view()).unwrap())
        });

        let inputs = BlendInputs {
            crude_ids: crude_ids.clone(),
            volumes,
        };
        let matrix = YieldMatrix::from_rows(&crude_ids, &rows).unwrap();
        let whole_crude = WholeCrudeTable::from_rows(&crude_ids, &whole_rows).unwrap();
        let name = format!("blend({crudes})");
        c.bench_function(&name, |b| {
            b.iter(|| blend::blend(black_box(&inputs), &matrix, &whole_crude).unwrap())
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
