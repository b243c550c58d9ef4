use anyhow::Result;
use std::path::PathBuf;

use mahdb::query::Query;
use mahdb::rel::Relation;

pub fn exec(name: PathBuf, pattern: String) -> Result<()> {
    let rel = Relation::open(&name)?;
    {
        let mut q = Query::new(&rel, &pattern)?;
        while let Some(t) = q.next_match()? {
            println!("{}", t);
        }
    }
    rel.close()
}
