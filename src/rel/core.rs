//! rel/core — ядро Relation: структура, MAH-адресация, доступ к страницам.
//!
//! Отношение — три файла (<stem>.info/.data/.ovflow) плюс дескриптор в
//! памяти. Инфо-хэндл держит эксклюзивную блокировку процесса: одно
//! отношение открывает ровно один процесс.

use crate::bits::lower_bits;
use crate::consts::PageId;
use crate::hash::HashKind;
use crate::meta::Descriptor;
use crate::page::Page;
use crate::pager::PageFile;
use crate::tuple::Tuple;
use anyhow::Result;
use std::fs::File;
use std::path::PathBuf;

#[derive(Debug)]
pub struct Relation {
    /// Путь без расширения; три файла получаются заменой расширения.
    pub(crate) stem: PathBuf,
    pub desc: Descriptor,
    pub hash_kind: HashKind,
    pub(crate) data: PageFile,
    pub(crate) ovflow: PageFile,
    /// Держит эксклюзивную блокировку и принимает дескриптор при закрытии.
    pub(crate) info: File,
    /// true после успешного close(); Drop тогда ничего не пишет.
    pub(crate) persisted: bool,
}

impl Relation {
    /// Имя отношения (последняя компонента пути без расширения).
    pub fn name(&self) -> String {
        self.stem
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.stem.display().to_string())
    }

    /// Составной MAH-хеш кортежа при текущем choice vector.
    pub(crate) fn tuple_hash(&self, t: &Tuple) -> u32 {
        let hashes = t.hashes(self.hash_kind);
        self.desc.chvec.compose(&hashes)
    }

    /// Адрес ведра по составному хешу при текущих (depth, sp):
    /// p = младшие depth бит; ведра ниже sp уже расщеплены и адресуются
    /// depth+1 битами.
    pub(crate) fn bucket_addr(&self, h: u32) -> PageId {
        let mut p = lower_bits(h, self.desc.depth);
        if p < self.desc.sp {
            p = lower_bits(h, self.desc.depth + 1);
        }
        p
    }

    #[inline]
    pub(crate) fn read_primary(&self, id: PageId) -> Result<Page> {
        self.data.read_page(id)
    }

    #[inline]
    pub(crate) fn read_ovflow(&self, id: PageId) -> Result<Page> {
        self.ovflow.read_page(id)
    }
}
