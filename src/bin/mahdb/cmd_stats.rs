use anyhow::Result;
use std::path::PathBuf;

use mahdb::rel::Relation;

pub fn exec(name: PathBuf, json: bool) -> Result<()> {
    let rel = Relation::open(&name)?;
    let st = rel.stats()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&st)?);
    } else {
        print!("{}", st);
    }
    rel.close()
}
