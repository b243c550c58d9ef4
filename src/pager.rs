//! pager — постраничный ввод-вывод поверх одного файла (<rel>.data или
//! <rel>.ovflow). Позиционирование — всегда id * PAGE_SIZE.
//!
//! Дисциплина владения: read_page возвращает свежий буфер, которым владеет
//! вызывающий; write_page записывает буфер обратно. Никакого кэша страниц —
//! каждая операция перечитывает диск, поэтому устаревших копий не бывает.

use crate::config::StoreConfig;
use crate::consts::{PageId, PAGE_SIZE};
use crate::error::StoreError;
use crate::metrics::{record_page_alloc, record_page_read, record_page_write};
use crate::page::Page;
use anyhow::{Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct PageFile {
    pub path: PathBuf,
    file: File,
    data_fsync: bool,
    verify_pages: bool,
}

impl PageFile {
    /// Создать пустой файл страниц. Ошибка, если файл уже существует.
    pub fn create(path: &Path, cfg: &StoreConfig) -> Result<Self> {
        let file = OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("create page file {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            data_fsync: cfg.data_fsync,
            verify_pages: cfg.verify_pages,
        })
    }

    pub fn open(path: &Path, cfg: &StoreConfig) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .with_context(|| format!("open page file {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            data_fsync: cfg.data_fsync,
            verify_pages: cfg.verify_pages,
        })
    }

    /// Число страниц в файле.
    pub fn npages(&self) -> Result<u32> {
        let len = self
            .file
            .metadata()
            .with_context(|| format!("stat {}", self.path.display()))?
            .len();
        if len % PAGE_SIZE as u64 != 0 {
            return Err(StoreError::Corruption(format!(
                "{}: length {} is not page-aligned",
                self.path.display(),
                len
            ))
            .into());
        }
        Ok((len / PAGE_SIZE as u64) as u32)
    }

    /// Прочитать ровно одну страницу. Буфером владеет вызывающий.
    pub fn read_page(&self, id: PageId) -> Result<Page> {
        let mut buf = Box::new([0u8; PAGE_SIZE]);
        let mut f = &self.file;
        f.seek(SeekFrom::Start(id as u64 * PAGE_SIZE as u64))
            .with_context(|| format!("seek to page {} in {}", id, self.path.display()))?;
        f.read_exact(&mut buf[..])
            .with_context(|| format!("read page {} from {}", id, self.path.display()))?;
        record_page_read();
        let page = Page::from_buf(buf);
        if self.verify_pages {
            page.verify()
                .with_context(|| format!("page {} of {}", id, self.path.display()))?;
        }
        Ok(page)
    }

    /// Записать страницу на её место; fsync только при включённом
    /// data_fsync.
    pub fn write_page(&mut self, id: PageId, page: &Page) -> Result<()> {
        let mut f = &self.file;
        f.seek(SeekFrom::Start(id as u64 * PAGE_SIZE as u64))
            .with_context(|| format!("seek to page {} in {}", id, self.path.display()))?;
        f.write_all(page.as_bytes())
            .with_context(|| format!("write page {} to {}", id, self.path.display()))?;
        if self.data_fsync {
            let _ = self.file.sync_all();
        }
        record_page_write();
        Ok(())
    }

    /// Дописать страницу в хвост файла; вернуть её id.
    pub fn append_page(&mut self, page: &Page) -> Result<PageId> {
        let id = self.npages()?;
        self.write_page(id, page)?;
        record_page_alloc();
        Ok(id)
    }
}
