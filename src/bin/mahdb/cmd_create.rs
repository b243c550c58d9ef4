use anyhow::Result;
use std::path::PathBuf;

use mahdb::rel::Relation;

pub fn exec(name: PathBuf, nattrs: u32, npages: u32, depth: u32, chvec: String) -> Result<()> {
    let rel = Relation::create(&name, nattrs, npages, depth, &chvec)?;
    println!(
        "created {} (nattrs={}, npages={}, depth={}, cv={})",
        name.display(),
        nattrs,
        npages,
        depth,
        rel.desc.chvec
    );
    rel.close()
}
