//! Benchmarks for frame graph declaration, compilation and recording.

use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use redlilium_framegraph::{
    DummyDevice, FrameGraph, PassKind, RecordingCommandList, ResourceHandle, TextureDescriptor,
    TextureFormat, TextureUsage,
};

/// Declare a chain of `count` passes, each reading the previous output.
fn declare_chain(graph: &mut FrameGraph, count: usize) -> ResourceHandle {
    let desc = TextureDescriptor::screen_relative(
        1.0,
        TextureFormat::Rgba16Float,
        TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
    );
    let mut previous: Option<ResourceHandle> = None;
    for index in 0..count {
        let output = *graph
            .add_pass(
                format!("pass_{index}"),
                PassKind::Graphics,
                |builder| {
                    if let Some(previous) = previous {
                        builder.read(previous, 0)?;
                    }
                    let target = builder.create_texture(format!("target_{index}"), desc.clone())?;
                    builder.write(target, 0)
                },
                |_, ctx| ctx.recorder().draw(3, 1),
            )
            .unwrap();
        previous = Some(output);
    }
    previous.unwrap()
}

fn new_graph() -> FrameGraph {
    FrameGraph::new(Arc::new(DummyDevice::new()))
}

fn bench_declare_small(c: &mut Criterion) {
    c.bench_function("frame_graph_declare_4_passes", |b| {
        b.iter(|| {
            let mut graph = new_graph();
            let output = declare_chain(&mut graph, 4);
            graph.mark_output(output).unwrap();
            black_box(&graph);
        })
    });
}

fn bench_compile_small(c: &mut Criterion) {
    c.bench_function("frame_graph_compile_4_passes", |b| {
        b.iter(|| {
            let mut graph = new_graph();
            let output = declare_chain(&mut graph, 4);
            graph.mark_output(output).unwrap();
            black_box(graph.compile().unwrap().pass_count());
        })
    });
}

fn bench_compile_large(c: &mut Criterion) {
    c.bench_function("frame_graph_compile_32_passes", |b| {
        b.iter(|| {
            let mut graph = new_graph();
            let output = declare_chain(&mut graph, 32);
            graph.mark_output(output).unwrap();
            black_box(graph.compile().unwrap().pass_count());
        })
    });
}

fn bench_cached_frame(c: &mut Criterion) {
    let mut graph = new_graph();
    let mut commands = RecordingCommandList::new();

    c.bench_function("frame_graph_cached_frame_32_passes", |b| {
        b.iter(|| {
            graph.reset();
            commands.clear();
            let output = declare_chain(&mut graph, 32);
            graph.mark_output(output).unwrap();
            black_box(graph.execute(&mut commands).unwrap());
        })
    });
}

criterion_group!(
    benches,
    bench_declare_small,
    bench_compile_small,
    bench_compile_large,
    bench_cached_frame,
);
criterion_main!(benches);
