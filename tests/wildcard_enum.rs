//! Перечисление вёдер по джокерам: граница числа выборок страниц.
//!
//! Единственный тест в этом бинаре: дельты процессных счётчиков метрик
//! не должны пересекаться с чужим страничным вводом-выводом.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use mahdb::config::StoreConfig;
use mahdb::metrics;
use mahdb::query::Query;
use mahdb::rel::Relation;

#[test]
fn bucket_fetches_are_bounded_by_star_count() -> Result<()> {
    let root = unique_root("fetches");
    fs::create_dir_all(&root)?;

    // depth=2, sp=0: адресация текущего момента — 3 младших бита
    // составного хеша, их источники — атрибуты 0,1,2.
    let mut rel = Relation::create_with_config(
        &root.join("R"),
        3,
        4,
        2,
        "0:0,1:0,2:0,0:1,1:1,2:1",
        StoreConfig::default(),
    )?;
    // capacity=34; 20 вставок сплита не вызывают
    for i in 0..20u32 {
        rel.insert(&format!("a{},b{},c{:02}", i % 4, i % 5, i))?;
    }
    assert_eq!(
        (rel.desc.depth, rel.desc.sp, rel.desc.npages),
        (2, 0, 4)
    );

    // Три звезды => не больше 2^3 выборок; старшая половина (p >= npages)
    // пропускается без чтения, так что ровно npages выборок.
    let before = metrics::snapshot();
    drain(Query::new(&rel, "?,?,?")?)?;
    let after = metrics::snapshot();
    let fetched = after.pages_read - before.pages_read;
    assert!(fetched <= 8, "full wildcard fetched {} pages", fetched);
    assert_eq!(fetched, 4);

    // Две звезды => не больше 4 выборок; существующих кандидатов ровно 2.
    let before = metrics::snapshot();
    drain(Query::new(&rel, "a1,?,?")?)?;
    let after = metrics::snapshot();
    let fetched = after.pages_read - before.pages_read;
    assert!(fetched <= 4, "a1,?,? fetched {} pages", fetched);
    assert_eq!(fetched, 2);

    // Без звёзд — одно ведро.
    let before = metrics::snapshot();
    drain(Query::new(&rel, "a1,b2,c17")?)?;
    let after = metrics::snapshot();
    assert_eq!(after.pages_read - before.pages_read, 1);

    rel.close()
}

fn drain(mut q: Query<'_>) -> Result<Vec<String>> {
    let mut out = Vec::new();
    while let Some(t) = q.next_match()? {
        out.push(t);
    }
    Ok(out)
}

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("mahdb-{}-{}-{}", prefix, pid, t))
}
