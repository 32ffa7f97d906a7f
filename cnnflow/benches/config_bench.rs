//! Benchmarks for configuration resolution.

use cnnflow::config::{read_yaml, ConfigurationManager, Params};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use std::path::Path;

fn write_config(root: &Path) -> std::path::PathBuf {
    let a = root.join("artifacts");
    let yaml = format!(
        "artifacts_root: {a}\n\
         data_ingestion:\n  \
           root_dir: {a}/data_ingestion\n  \
           source_URL: https://drive.google.com/file/d/ABC123/view?usp=sharing\n  \
           local_data_file: {a}/data_ingestion/data.zip\n  \
           unzip_dir: {a}/data_ingestion\n\
         prepare_base_model:\n  \
           root_dir: {a}/prepare_base_model\n  \
           base_model_path: {a}/prepare_base_model/base_model.json\n  \
           updated_base_model_path: {a}/prepare_base_model/base_model_updated.json\n",
        a = a.display()
    );
    let path = root.join("config.yaml");
    std::fs::write(&path, yaml).expect("write config");
    path
}

fn config_benchmark(c: &mut Criterion) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = write_config(tmp.path());

    c.bench_function("read_yaml", |b| {
        b.iter(|| black_box(read_yaml(black_box(&path)).expect("config loads")));
    });

    c.bench_function("stage_configs", |b| {
        b.iter(|| {
            let manager =
                ConfigurationManager::new(&path, Params::default()).expect("manager builds");
            black_box(manager.get_data_ingestion_config().expect("ingestion config"));
            black_box(manager.get_prepare_base_model_config().expect("model config"));
        });
    });
}

criterion_group!(benches, config_benchmark);
criterion_main!(benches);
