//! Страница — единственная байт-точная структура на диске.
//!
//! Формат (LE):
//! [ntuples u32][free u32][ovflow u32][data: упакованные NUL-терминированные кортежи]
//!
//! `free` — байтовое смещение внутри data-области, по которому ляжет
//! следующий кортеж; инвариант: free == сумма длин кортежей с
//! терминаторами. `ovflow` — id следующей страницы цепочки в ovflow-файле
//! либо NO_PAGE.

use crate::consts::{
    NO_PAGE, OFF_FREE, OFF_NTUPLES, OFF_OVFLOW, PAGE_DATA_SIZE, PAGE_HDR_SIZE, PAGE_SIZE, PageId,
};
use crate::error::StoreError;
use anyhow::Result;
use byteorder::{ByteOrder, LittleEndian};

pub struct Page {
    buf: Box<[u8; PAGE_SIZE]>,
}

impl Page {
    /// Пустая страница в памяти: ntuples=0, free=0, ovflow=NO_PAGE.
    pub fn new() -> Self {
        let mut p = Self {
            buf: Box::new([0u8; PAGE_SIZE]),
        };
        p.set_ovflow(NO_PAGE);
        p
    }

    pub fn from_buf(buf: Box<[u8; PAGE_SIZE]>) -> Self {
        Self { buf }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..]
    }

    #[inline]
    pub fn ntuples(&self) -> u32 {
        LittleEndian::read_u32(&self.buf[OFF_NTUPLES..OFF_NTUPLES + 4])
    }

    #[inline]
    fn set_ntuples(&mut self, n: u32) {
        LittleEndian::write_u32(&mut self.buf[OFF_NTUPLES..OFF_NTUPLES + 4], n);
    }

    /// Смещение внутри data-области, по которому ляжет следующий кортеж.
    #[inline]
    pub fn free(&self) -> u32 {
        LittleEndian::read_u32(&self.buf[OFF_FREE..OFF_FREE + 4])
    }

    #[inline]
    fn set_free(&mut self, off: u32) {
        LittleEndian::write_u32(&mut self.buf[OFF_FREE..OFF_FREE + 4], off);
    }

    #[inline]
    pub fn ovflow(&self) -> PageId {
        LittleEndian::read_u32(&self.buf[OFF_OVFLOW..OFF_OVFLOW + 4])
    }

    #[inline]
    pub fn set_ovflow(&mut self, id: PageId) {
        LittleEndian::write_u32(&mut self.buf[OFF_OVFLOW..OFF_OVFLOW + 4], id);
    }

    /// Свободные байты data-области.
    #[inline]
    pub fn free_space(&self) -> usize {
        PAGE_DATA_SIZE - self.free() as usize
    }

    /// Дописать кортеж (терминатор добавляется здесь), если он помещается.
    pub fn add_tuple(&mut self, tuple: &str) -> bool {
        let need = tuple.len() + 1;
        if need > self.free_space() {
            return false;
        }
        let off = PAGE_HDR_SIZE + self.free() as usize;
        self.buf[off..off + tuple.len()].copy_from_slice(tuple.as_bytes());
        self.buf[off + tuple.len()] = 0;
        self.set_free(self.free() + need as u32);
        self.set_ntuples(self.ntuples() + 1);
        true
    }

    /// Кортежи страницы в порядке укладки. Corruption, если NUL-прогон
    /// не согласуется с ntuples/free.
    pub fn tuples(&self) -> Result<Vec<String>> {
        let free = self.free() as usize;
        if free > PAGE_DATA_SIZE {
            return Err(StoreError::Corruption(format!(
                "page free offset {} exceeds data area {}",
                free, PAGE_DATA_SIZE
            ))
            .into());
        }
        let data = &self.buf[PAGE_HDR_SIZE..PAGE_HDR_SIZE + free];
        if free > 0 && data[free - 1] != 0 {
            return Err(
                StoreError::Corruption("tuple run does not end with a NUL".into()).into(),
            );
        }
        let mut out = Vec::with_capacity(self.ntuples() as usize);
        let mut start = 0usize;
        for (i, &b) in data.iter().enumerate() {
            if b == 0 {
                if i == start {
                    return Err(
                        StoreError::Corruption("empty tuple in page run".into()).into()
                    );
                }
                let s = std::str::from_utf8(&data[start..i]).map_err(|_| {
                    StoreError::Corruption("tuple run is not valid UTF-8".into())
                })?;
                out.push(s.to_string());
                start = i + 1;
            }
        }
        if out.len() != self.ntuples() as usize {
            return Err(StoreError::Corruption(format!(
                "page header says {} tuples, run holds {}",
                self.ntuples(),
                out.len()
            ))
            .into());
        }
        Ok(out)
    }

    /// Проверка согласованности заголовка и прогона кортежей.
    pub fn verify(&self) -> Result<()> {
        self.tuples().map(|_| ())
    }

    /// Опустошить страницу, сохранив ссылку на цепочку. Используется
    /// сплитом: источник заменяется пустой страницей с прежним ovflow.
    pub fn clear_keep_link(&mut self) {
        let link = self.ovflow();
        self.buf.fill(0);
        self.set_ovflow(link);
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PAGE_DATA_SIZE;

    #[test]
    fn empty_page_header() {
        let p = Page::new();
        assert_eq!(p.ntuples(), 0);
        assert_eq!(p.free(), 0);
        assert_eq!(p.ovflow(), NO_PAGE);
        assert_eq!(p.free_space(), PAGE_DATA_SIZE);
        assert!(p.tuples().unwrap().is_empty());
    }

    #[test]
    fn add_and_iterate() {
        let mut p = Page::new();
        assert!(p.add_tuple("a,b"));
        assert!(p.add_tuple("cc,dd"));
        assert_eq!(p.ntuples(), 2);
        assert_eq!(p.free(), 4 + 6);
        assert_eq!(p.tuples().unwrap(), vec!["a,b", "cc,dd"]);
    }

    #[test]
    fn fills_up_and_rejects() {
        let mut p = Page::new();
        let tup = "x".repeat(99); // 100 байт с терминатором
        let mut n = 0;
        while p.add_tuple(&tup) {
            n += 1;
        }
        assert_eq!(n, PAGE_DATA_SIZE / 100);
        assert!(p.free_space() < 100);
        // маленький всё ещё помещается
        assert!(p.add_tuple("y"));
    }

    #[test]
    fn oversized_tuple_rejected() {
        let mut p = Page::new();
        assert!(!p.add_tuple(&"z".repeat(PAGE_DATA_SIZE)));
        assert!(p.add_tuple(&"z".repeat(PAGE_DATA_SIZE - 1)));
    }

    #[test]
    fn ovflow_link_roundtrip() {
        let mut p = Page::new();
        p.set_ovflow(7);
        assert_eq!(p.ovflow(), 7);
        p.set_ovflow(NO_PAGE);
        assert_eq!(p.ovflow(), NO_PAGE);
    }

    #[test]
    fn clear_keeps_link() {
        let mut p = Page::new();
        p.add_tuple("a,b");
        p.set_ovflow(3);
        p.clear_keep_link();
        assert_eq!(p.ntuples(), 0);
        assert_eq!(p.free(), 0);
        assert_eq!(p.ovflow(), 3);
        assert!(p.tuples().unwrap().is_empty());
    }

    #[test]
    fn verify_catches_header_mismatch() {
        let mut p = Page::new();
        p.add_tuple("a,b");
        p.set_ntuples(2); // заголовок лжёт
        assert!(p.verify().is_err());
    }
}
