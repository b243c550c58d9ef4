//! rel/stats — диагностический обход: глобальные счётчики плюс цепочка
//! каждого ведра в порядке обхода. Единственный «только читающий» обход
//! помимо запросов.

use crate::consts::{NO_PAGE, PageId};
use anyhow::Result;
use serde::Serialize;
use std::fmt;

use super::core::Relation;

/// Одна страница цепочки: (id, ntuples, freebytes, ovflow).
#[derive(Debug, Clone, Serialize)]
pub struct PageStat {
    pub id: PageId,
    pub ntuples: u32,
    pub free_bytes: u32,
    pub ovflow: Option<PageId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RelStats {
    pub nattrs: u32,
    pub depth: u32,
    pub sp: u32,
    pub npages: u32,
    pub ntups: u32,
    pub capacity: u32,
    pub insertion: u32,
    /// buckets[b] — цепочка ведра b: первичная страница, затем страницы
    /// переполнения в порядке ссылок.
    pub buckets: Vec<Vec<PageStat>>,
}

impl Relation {
    pub fn stats(&self) -> Result<RelStats> {
        let mut buckets = Vec::with_capacity(self.desc.npages as usize);
        for b in 0..self.desc.npages {
            let mut chain = Vec::new();
            let page = self.read_primary(b)?;
            chain.push(PageStat {
                id: b,
                ntuples: page.ntuples(),
                free_bytes: page.free_space() as u32,
                ovflow: (page.ovflow() != NO_PAGE).then(|| page.ovflow()),
            });
            let mut cur = page.ovflow();
            while cur != NO_PAGE {
                let ov = self.read_ovflow(cur)?;
                chain.push(PageStat {
                    id: cur,
                    ntuples: ov.ntuples(),
                    free_bytes: ov.free_space() as u32,
                    ovflow: (ov.ovflow() != NO_PAGE).then(|| ov.ovflow()),
                });
                cur = ov.ovflow();
            }
            buckets.push(chain);
        }
        Ok(RelStats {
            nattrs: self.desc.nattrs,
            depth: self.desc.depth,
            sp: self.desc.sp,
            npages: self.desc.npages,
            ntups: self.desc.ntups,
            capacity: self.desc.capacity,
            insertion: self.desc.insertion,
            buckets,
        })
    }

    /// Все кортежи ведра b в порядке обхода цепочки. Диагностика; запросы
    /// этим не пользуются.
    pub fn bucket_tuples(&self, b: PageId) -> Result<Vec<String>> {
        let mut out = Vec::new();
        let page = self.read_primary(b)?;
        out.extend(page.tuples()?);
        let mut cur = page.ovflow();
        while cur != NO_PAGE {
            let ov = self.read_ovflow(cur)?;
            out.extend(ov.tuples()?);
            cur = ov.ovflow();
        }
        Ok(out)
    }
}

impl fmt::Display for RelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "#attrs: {}  depth: {}  sp: {}  #pages: {}  #tuples: {}  capacity: {}",
            self.nattrs, self.depth, self.sp, self.npages, self.ntups, self.capacity
        )?;
        writeln!(f, "bucket  (pageID, #tuples, freebytes, ovflow)")?;
        for (b, chain) in self.buckets.iter().enumerate() {
            write!(f, "{:<6}", b)?;
            for (i, ps) in chain.iter().enumerate() {
                if i > 0 {
                    write!(f, " -> ")?;
                } else {
                    write!(f, "  ")?;
                }
                match ps.ovflow {
                    Some(ov) => write!(
                        f,
                        "({},{},{},{})",
                        ps.id, ps.ntuples, ps.free_bytes, ov
                    )?,
                    None => write!(f, "({},{},{},-)", ps.id, ps.ntuples, ps.free_bytes)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
