use criterion::{criterion_group, criterion_main, Criterion};
use hexed_buffer::{Buffer, Tag};

const CAP: u64 = 1_000_000;
const TAG: Tag = Tag::new(0);

fn insert(c: &mut Criterion) {
    c.bench_function("insert_start", |bench| {
        let mut buf = Buffer::new();
        bench.iter(move || {
            if buf.len() >= CAP {
                buf = Buffer::new();
            }

            buf.insert_bytes_at(0, TAG, b"a")
        });
    });

    c.bench_function("insert_middle", |bench| {
        let mut buf = Buffer::new();
        bench.iter(move || {
            if buf.len() >= CAP {
                buf = Buffer::new();
            }

            buf.insert_bytes_at((buf.len() + 1) / 2, TAG, b"a")
        });
    });

    c.bench_function("insert_end", |bench| {
        let mut buf = Buffer::new();
        bench.iter(move || {
            if buf.len() >= CAP {
                buf = Buffer::new();
            }

            buf.insert_bytes_at(buf.len(), TAG, b"a")
        });
    });
}

fn full_buf() -> Buffer {
    Buffer::from(vec![0xAA; CAP as usize])
}

fn remove(c: &mut Criterion) {
    c.bench_function("remove_start", |bench| {
        let mut buf = full_buf();

        bench.iter(move || {
            if buf.is_empty() {
                buf = full_buf();
            }

            buf.delete_bytes_at(0, TAG, 1)
        });
    });

    c.bench_function("remove_middle", |bench| {
        let mut buf = full_buf();

        bench.iter(move || {
            if buf.is_empty() {
                buf = full_buf();
            }

            buf.delete_bytes_at(buf.len() / 2, TAG, 1)
        });
    });

    c.bench_function("remove_end", |bench| {
        let mut buf = full_buf();

        bench.iter(move || {
            if buf.is_empty() {
                buf = full_buf();
            }

            buf.delete_bytes_at(buf.len() - 1, TAG, 1)
        });
    });
}

fn undo_redo(c: &mut Criterion) {
    c.bench_function("undo_redo_middle", |bench| {
        let mut buf = full_buf();
        for i in 0..1000 {
            let _ = buf.replace_bytes_at(i * 100, TAG, 2, b"abc");
        }

        bench.iter(move || {
            if buf.undo().is_err() {
                while buf.redo().is_ok() {}
            }
        });
    });
}

criterion_group!(benches, insert, remove, undo_redo);
criterion_main!(benches);
