use std::collections::HashMap;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use proxyscope::resolve::PassthroughResolver;
use proxyscope::stats::{parse_snapshot_at, schema};

/// Emit one data row over `columns` from (column, value) pairs.
fn row(columns: &[&str], values: &[(&str, &str)]) -> String {
    let map: HashMap<&str, &str> = values.iter().copied().collect();
    columns
        .iter()
        .map(|col| map.get(col).copied().unwrap_or(""))
        .collect::<Vec<_>>()
        .join(",")
}

/// Build a realistic snapshot: `proxies` proxies, each with one frontend,
/// one backend, `servers` pool members, and one listener.
fn build_snapshot(proxies: usize, servers: usize) -> String {
    let columns = schema::reference_fields();
    let mut text = format!("# {}\n", columns.join(","));

    for p in 0..proxies {
        let name = format!("proxy-{p}");
        text.push_str(&row(
            &columns,
            &[
                ("pxname", &name),
                ("svname", "FRONTEND"),
                ("scur", "12"),
                ("stot", "9000"),
                ("rate", "7"),
                ("status", "OPEN"),
            ],
        ));
        text.push('\n');
        text.push_str(&row(
            &columns,
            &[
                ("pxname", &name),
                ("svname", "sock-1"),
                ("scur", "12"),
                ("status", "OPEN"),
            ],
        ));
        text.push('\n');
        for s in 0..servers {
            let member = format!("node-{s}");
            text.push_str(&row(
                &columns,
                &[
                    ("pxname", &name),
                    ("svname", &member),
                    ("qcur", "0"),
                    ("scur", "5"),
                    ("weight", "100"),
                    ("status", "UP"),
                    ("check_status", "L7OK"),
                ],
            ));
            text.push('\n');
        }
        text.push_str(&row(
            &columns,
            &[
                ("pxname", &name),
                ("svname", "BACKEND"),
                ("qcur", "0"),
                ("scur", "12"),
                ("status", "UP"),
            ],
        ));
        text.push('\n');
    }

    text
}

fn bench_parse(c: &mut Criterion) {
    let snapshot = build_snapshot(50, 8);
    let resolver = PassthroughResolver;

    c.bench_function("parse_snapshot_50_proxies", |b| {
        b.iter(|| {
            let parsed =
                parse_snapshot_at(black_box(&snapshot), &resolver, 1_700_000_000).expect("parse");
            black_box(parsed)
        })
    });
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);
