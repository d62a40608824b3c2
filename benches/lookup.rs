use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use bytecode_debuginfo::{DebugInfo, DebugInfoGenerator, DebugSourceLocation, FilenameTable};

const FUNCTIONS: u32 = 200;

fn locations_per_function(size: u32, function_index: u32) -> Vec<DebugSourceLocation> {
    let mut address = 0;
    (0..size)
        .map(|i| {
            address += 1 + (i * 7 + function_index) % 13;
            DebugSourceLocation::new(
                address,
                function_index % 4,
                1 + function_index * 50 + i / 2,
                1 + (i * 17) % 90,
                i / 3,
            )
        })
        .collect()
}

fn create_debug_info(size: u32) -> (DebugInfo, Vec<u32>) {
    let mut filenames = FilenameTable::new();
    for name in &["a.js", "b.js", "c.js", "d.js"] {
        filenames.add_filename(name);
    }
    let mut gen = DebugInfoGenerator::new(filenames);
    let offsets = (0..FUNCTIONS)
        .map(|function_index| {
            let locations = locations_per_function(size, function_index);
            gen.append_source_locations(&locations[0], function_index, &locations[1..])
        })
        .collect();
    (gen.serialize_with_move(), offsets)
}

pub fn creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("Debug info creation");
    for size in &[16, 128, 1024] {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| create_debug_info(*size))
        });
    }
    group.finish();
}

pub fn lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("Address lookup");
    for size in &[16, 128, 1024] {
        let (info, offsets) = create_debug_info(*size);
        // spread the queries over the whole address range of each function
        let queries: Vec<_> = (0..1000u32)
            .map(|i| (offsets[(i * 31 % FUNCTIONS) as usize], i * 97 % (size * 7)))
            .collect();

        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| {
                for (offset, address) in &queries {
                    info.get_location_for_address(*offset, *address);
                }
            })
        });
    }
    group.finish();
}

pub fn reverse_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("Location lookup");
    for size in &[16, 128] {
        let (info, _) = create_debug_info(*size);
        let queries: Vec<_> = (0..100u32)
            .map(|i| (i % 4, 1 + (i * 53) % (FUNCTIONS * 50)))
            .collect();

        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            b.iter(|| {
                for (filename_id, line) in &queries {
                    info.get_address_for_location(*filename_id, *line, None);
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, creation, lookup, reverse_lookup);
criterion_main!(benches);
