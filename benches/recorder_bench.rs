use criterion::{black_box, criterion_group, criterion_main, Criterion};
use cursor_undo::{BufferModel, CursorUndo, EngineConfig, MemoryHost};

fn run_moves(engine: &CursorUndo, commands: &[&str], moves: usize) -> MemoryHost {
    let mut host = MemoryHost::with_text("x".repeat(moves + 1));
    for i in 0..moves {
        let command = commands[i % commands.len()];
        host.command(command, |h| {
            engine.run_movement(command, h, |h| -> Result<(), ()> {
                h.forward_char(1);
                Ok(())
            })
        })
        .ok();
    }
    host
}

fn bench_repeated_movement(c: &mut Criterion) {
    let engine = CursorUndo::new(&EngineConfig::default()).unwrap();

    c.bench_function("recorder_burst_1000", |b| {
        b.iter(|| {
            let host = run_moves(&engine, &["forward-char"], black_box(1000));
            black_box(host.point())
        })
    });

    c.bench_function("recorder_alternating_1000", |b| {
        b.iter(|| {
            let host = run_moves(&engine, &["forward-char", "forward-word"], black_box(1000));
            black_box(host.point())
        })
    });
}

criterion_group!(benches, bench_repeated_movement);
criterion_main!(benches);
