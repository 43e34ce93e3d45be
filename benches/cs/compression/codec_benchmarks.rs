use classic_codecs::cs::compression::{Codec, Compression, Huffman, Lz77, Lzw, ShannonFano};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn generate_text(len: usize) -> Vec<u8> {
    let words: [&[u8]; 8] = [
        b"the ", b"quick ", b"brown ", b"fox ", b"jumps ", b"over ", b"lazy ", b"dog. ",
    ];
    let mut rng = StdRng::seed_from_u64(42);
    let mut text = Vec::with_capacity(len + 8);
    while text.len() < len {
        text.extend_from_slice(words[rng.gen_range(0..words.len())]);
    }
    text.truncate(len);
    text
}

fn codecs() -> Vec<Codec> {
    vec![
        Huffman.into(),
        ShannonFano.into(),
        Lz77::default().into(),
        Lzw::default().into(),
    ]
}

fn bench_compress(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress");
    for size in [1_000, 10_000, 100_000] {
        let data = generate_text(size);
        group.throughput(Throughput::Bytes(size as u64));
        for codec in codecs() {
            group.bench_with_input(BenchmarkId::new(codec.name(), size), &data, |b, data| {
                b.iter(|| codec.compress(black_box(data)).unwrap())
            });
        }
    }
    group.finish();
}

fn bench_decompress(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompress");
    for size in [1_000, 10_000, 100_000] {
        let data = generate_text(size);
        group.throughput(Throughput::Bytes(size as u64));
        for codec in codecs() {
            let compressed = codec.compress(&data).unwrap();
            group.bench_with_input(
                BenchmarkId::new(codec.name(), size),
                &compressed,
                |b, compressed| b.iter(|| codec.decompress(black_box(compressed)).unwrap()),
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_compress, bench_decompress);
criterion_main!(benches);
