use criterion::{black_box, criterion_group, criterion_main, Criterion};
use portwho::{
    port::{parse_connections, PortQuery, PortScanner},
    system::SystemTools,
    ToolError,
};
use tokio::runtime::Runtime;

/// A netstat table of roughly the size seen on a busy developer machine.
fn netstat_output(rows: usize) -> String {
    (0..rows)
        .map(|i| {
            let port = 1024 + (i % 60000);
            if i % 5 == 0 {
                format!("  UDP    0.0.0.0:{port}    *:*    {}\r\n", 4000 + i)
            } else {
                format!(
                    "  TCP    127.0.0.1:{port}    10.0.0.1:{}    ESTABLISHED    {}\r\n",
                    40000 + (i % 20000),
                    4000 + i
                )
            }
        })
        .collect()
}

struct CannedTools {
    output: String,
}

impl SystemTools for CannedTools {
    async fn list_connections(&self, filter: &str) -> Result<String, ToolError> {
        Ok(self
            .output
            .lines()
            .filter(|line| line.contains(filter))
            .map(|line| format!("{line}\n"))
            .collect())
    }

    async fn list_process_by_pid(&self, pid: &str) -> Result<String, ToolError> {
        Ok(format!("bench.exe {pid} Console 1 1,000 K"))
    }

    async fn terminate_process(&self, _pid: &str) -> Result<(), ToolError> {
        Ok(())
    }
}

fn benchmark_parse_exact(c: &mut Criterion) {
    let output = netstat_output(5000);
    let query = PortQuery::new("3023", true, true);

    c.bench_function("parse_connections_exact", |b| {
        b.iter(|| black_box(parse_connections(black_box(&output), &query)));
    });
}

fn benchmark_parse_fuzzy(c: &mut Criterion) {
    let output = netstat_output(5000);
    let query = PortQuery::new("30", true, false);

    c.bench_function("parse_connections_fuzzy", |b| {
        b.iter(|| black_box(parse_connections(black_box(&output), &query)));
    });
}

fn benchmark_collect_and_enrich(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let scanner = PortScanner::new(CannedTools {
        output: netstat_output(5000),
    });
    let queries = [
        PortQuery::new("3000", true, false),
        PortQuery::new("1030", true, true),
    ];

    c.bench_function("collect_and_enrich_two_ports", |b| {
        b.to_async(&rt).iter(|| async {
            let result = scanner.collect_and_enrich(&queries).await;
            black_box(result)
        });
    });
}

criterion_group!(
    benches,
    benchmark_parse_exact,
    benchmark_parse_fuzzy,
    benchmark_collect_and_enrich
);
criterion_main!(benches);
