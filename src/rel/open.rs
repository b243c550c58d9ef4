//! rel/open — жизненный цикл отношения: создание, открытие, закрытие.
//!
//! Создание заводит три файла и преаллоцирует npages пустых первичных
//! страниц; открытие перечитывает дескриптор и сверяет его с длиной
//! data-файла; закрытие переписывает дескриптор на месте. Drop делает то
//! же самое best-effort, если close() не вызывали.

use crate::chvec::ChoiceVec;
use crate::config::StoreConfig;
use crate::consts::{DATA_EXT, INFO_EXT, OVFLOW_EXT};
use crate::error::StoreError;
use crate::hash::HASH_KIND_DEFAULT;
use crate::meta::{read_desc, write_desc, Descriptor};
use crate::page::Page;
use crate::pager::PageFile;
use anyhow::{Context, Result};
use fs2::FileExt;
use log::{error, info};
use std::fs::OpenOptions;
use std::path::Path;

use super::core::Relation;

impl Relation {
    pub fn create(stem: &Path, nattrs: u32, npages: u32, depth: u32, cv: &str) -> Result<Self> {
        Self::create_with_config(stem, nattrs, npages, depth, cv, StoreConfig::from_env())
    }

    pub fn create_with_config(
        stem: &Path,
        nattrs: u32,
        npages: u32,
        depth: u32,
        cv: &str,
        cfg: StoreConfig,
    ) -> Result<Self> {
        if nattrs == 0 {
            return Err(StoreError::Parse("nattrs must be >= 1".into()).into());
        }
        let capacity = Descriptor::capacity_for(nattrs);
        if capacity == 0 {
            return Err(StoreError::Parse(format!(
                "nattrs {} leaves no per-page capacity",
                nattrs
            ))
            .into());
        }
        if depth >= 30 {
            return Err(StoreError::Parse(format!("depth {} out of range", depth)).into());
        }
        let base = 1u32 << depth;
        if npages < base || npages >= base * 2 {
            return Err(StoreError::Parse(format!(
                "npages {} must satisfy 2^depth <= npages < 2^(depth+1) for depth {}",
                npages, depth
            ))
            .into());
        }
        let chvec = ChoiceVec::parse(cv, nattrs)?;

        let info_path = stem.with_extension(INFO_EXT);
        let info = OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(&info_path)
            .with_context(|| format!("create info file {}", info_path.display()))?;
        info.lock_exclusive()
            .with_context(|| format!("lock_exclusive {}", info_path.display()))?;

        let mut data = PageFile::create(&stem.with_extension(DATA_EXT), &cfg)?;
        let ovflow = PageFile::create(&stem.with_extension(OVFLOW_EXT), &cfg)?;

        // Преаллоцируем пустые первичные страницы.
        let empty = Page::new();
        for _ in 0..npages {
            data.append_page(&empty)?;
        }

        let desc = Descriptor {
            nattrs,
            depth,
            sp: npages - base,
            npages,
            ntups: 0,
            capacity,
            insertion: 0,
            splitting: false,
            chvec,
        };
        write_desc(&info, &desc)?;

        info!(
            "created relation {} (nattrs={}, npages={}, depth={}, capacity={})",
            stem.display(),
            nattrs,
            npages,
            depth,
            capacity
        );

        Ok(Self {
            stem: stem.to_path_buf(),
            desc,
            hash_kind: HASH_KIND_DEFAULT,
            data,
            ovflow,
            info,
            persisted: false,
        })
    }

    pub fn open(stem: &Path) -> Result<Self> {
        Self::open_with_config(stem, StoreConfig::from_env())
    }

    pub fn open_with_config(stem: &Path, cfg: StoreConfig) -> Result<Self> {
        let info_path = stem.with_extension(INFO_EXT);
        if !info_path.exists() {
            return Err(StoreError::NotFound(stem.display().to_string()).into());
        }
        let info = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&info_path)
            .with_context(|| format!("open info file {}", info_path.display()))?;
        info.lock_exclusive()
            .with_context(|| format!("lock_exclusive {}", info_path.display()))?;

        let desc = read_desc(&info)
            .with_context(|| format!("read descriptor of {}", stem.display()))?;

        let data = PageFile::open(&stem.with_extension(DATA_EXT), &cfg)?;
        let ovflow = PageFile::open(&stem.with_extension(OVFLOW_EXT), &cfg)?;

        // Дескриптор и data-файл должны сходиться по числу страниц.
        let actual = data.npages()?;
        if actual != desc.npages {
            return Err(StoreError::Corruption(format!(
                "descriptor says {} primary pages, data file holds {}",
                desc.npages, actual
            ))
            .into());
        }

        info!(
            "opened relation {} (ntups={}, depth={}, sp={}, npages={})",
            stem.display(),
            desc.ntups,
            desc.depth,
            desc.sp,
            desc.npages
        );

        Ok(Self {
            stem: stem.to_path_buf(),
            desc,
            hash_kind: HASH_KIND_DEFAULT,
            data,
            ovflow,
            info,
            persisted: false,
        })
    }

    fn write_back(&self) -> Result<()> {
        write_desc(&self.info, &self.desc)
            .with_context(|| format!("write back descriptor of {}", self.stem.display()))
    }

    /// Закрыть отношение, записав дескриптор. Ошибки — наружу; Drop после
    /// успешного close() ничего не делает.
    pub fn close(mut self) -> Result<()> {
        self.write_back()?;
        self.persisted = true;
        Ok(())
    }
}

impl Drop for Relation {
    fn drop(&mut self) {
        if !self.persisted {
            if let Err(e) = self.write_back() {
                error!("drop: {:#}", e);
            }
        }
    }
}
