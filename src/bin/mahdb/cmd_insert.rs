use anyhow::Result;
use std::io::BufRead;
use std::path::PathBuf;

use mahdb::rel::Relation;

/// Вставка печатает id ведра, в которое лёг кортеж, по строке на кортеж.
pub fn exec(name: PathBuf, tuple: String) -> Result<()> {
    let mut rel = Relation::open(&name)?;

    if tuple == "-" {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = line?;
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                continue;
            }
            let p = rel.insert(line)?;
            println!("{}", p);
        }
    } else {
        let p = rel.insert(&tuple)?;
        println!("{}", p);
    }

    rel.close()
}
