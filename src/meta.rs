//! meta — дескриптор отношения и его (де)сериализация в <rel>.info.
//!
//! Формат (LE):
//! u32 nattrs       — арность схемы
//! u32 depth        — число младших бит адресации (d)
//! u32 sp           — указатель расщепления
//! u32 npages       — число первичных страниц
//! u32 ntups        — всего кортежей
//! u32 capacity     — c = 1024 / (10*nattrs), эвристика-триггер сплита
//! u32 insertion    — вставок с последнего сплита
//! u32 splitting    — 0|1; в состоянии покоя всегда 0
//! MAXCHVEC × (u32 att, u32 bit)
//! u32 crc32        — хвост по предыдущим байтам; файл без хвоста
//!                    принимается и не проверяется
//!
//! Дескриптор переписывается на месте при закрытии отношения; файл держит
//! эксклюзивную блокировку, поэтому tmp+rename здесь не нужен (и сломал бы
//! блокировку, живущую на inode).

use crate::chvec::ChoiceVec;
use crate::consts::{DESC_BYTES, PAGE_SIZE};
use crate::error::StoreError;
use anyhow::{Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

#[derive(Debug, Clone)]
pub struct Descriptor {
    pub nattrs: u32,
    pub depth: u32,
    pub sp: u32,
    pub npages: u32,
    pub ntups: u32,
    pub capacity: u32,
    pub insertion: u32,
    pub splitting: bool,
    pub chvec: ChoiceVec,
}

impl Descriptor {
    /// Эвристика ёмкости страницы, используемая как триггер сплита.
    /// Реального свободного места она не отражает — и не должна.
    pub fn capacity_for(nattrs: u32) -> u32 {
        PAGE_SIZE as u32 / (10 * nattrs)
    }
}

fn encode(d: &Descriptor) -> Result<Vec<u8>> {
    let mut body = Vec::with_capacity(DESC_BYTES);
    body.write_u32::<LittleEndian>(d.nattrs)?;
    body.write_u32::<LittleEndian>(d.depth)?;
    body.write_u32::<LittleEndian>(d.sp)?;
    body.write_u32::<LittleEndian>(d.npages)?;
    body.write_u32::<LittleEndian>(d.ntups)?;
    body.write_u32::<LittleEndian>(d.capacity)?;
    body.write_u32::<LittleEndian>(d.insertion)?;
    body.write_u32::<LittleEndian>(if d.splitting { 1 } else { 0 })?;
    d.chvec.encode(&mut body)?;
    debug_assert_eq!(body.len(), DESC_BYTES);
    Ok(body)
}

/// Записать дескриптор с начала файла (поверх прежнего) и зафиксировать.
pub fn write_desc(f: &File, d: &Descriptor) -> Result<()> {
    let body = encode(d)?;
    let crc = crc32fast::hash(&body);

    let mut w = f;
    w.seek(SeekFrom::Start(0)).context("seek info file")?;
    w.write_all(&body).context("write descriptor")?;
    w.write_u32::<LittleEndian>(crc)
        .context("write descriptor crc")?;
    f.set_len((DESC_BYTES + 4) as u64)?;
    f.sync_all().context("sync info file")?;
    Ok(())
}

/// Прочитать и проверить дескриптор.
pub fn read_desc(f: &File) -> Result<Descriptor> {
    let mut r = f;
    r.seek(SeekFrom::Start(0)).context("seek info file")?;

    let mut body = vec![0u8; DESC_BYTES];
    if let Err(e) = r.read_exact(&mut body) {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            return Err(StoreError::Corruption(
                "info file shorter than the descriptor".into(),
            )
            .into());
        }
        return Err(e).context("read descriptor");
    }

    // Хвостовой CRC: проверяем, только если он есть.
    match r.read_u32::<LittleEndian>() {
        Ok(stored) => {
            let calc = crc32fast::hash(&body);
            if stored != calc {
                return Err(StoreError::Corruption(format!(
                    "descriptor crc mismatch (stored={:#x}, calc={:#x})",
                    stored, calc
                ))
                .into());
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {}
        Err(e) => return Err(e).context("read descriptor crc"),
    }

    let mut c = body.as_slice();
    let nattrs = c.read_u32::<LittleEndian>()?;
    let depth = c.read_u32::<LittleEndian>()?;
    let sp = c.read_u32::<LittleEndian>()?;
    let npages = c.read_u32::<LittleEndian>()?;
    let ntups = c.read_u32::<LittleEndian>()?;
    let capacity = c.read_u32::<LittleEndian>()?;
    let insertion = c.read_u32::<LittleEndian>()?;
    let splitting = c.read_u32::<LittleEndian>()?;
    let chvec = ChoiceVec::decode(&mut c)?;

    let d = Descriptor {
        nattrs,
        depth,
        sp,
        npages,
        ntups,
        capacity,
        insertion,
        splitting: splitting != 0,
        chvec,
    };
    validate(&d, splitting)?;
    Ok(d)
}

fn validate(d: &Descriptor, splitting_raw: u32) -> Result<()> {
    let corrupt = |msg: String| -> anyhow::Error { StoreError::Corruption(msg).into() };

    if d.nattrs == 0 {
        return Err(corrupt("descriptor has nattrs=0".into()));
    }
    if d.capacity != Descriptor::capacity_for(d.nattrs) {
        return Err(corrupt(format!(
            "descriptor capacity {} disagrees with nattrs {}",
            d.capacity, d.nattrs
        )));
    }
    if d.depth >= 30 {
        return Err(corrupt(format!("descriptor depth {} out of range", d.depth)));
    }
    let base = 1u32 << d.depth;
    if d.sp > base {
        return Err(corrupt(format!(
            "split pointer {} exceeds 2^depth = {}",
            d.sp, base
        )));
    }
    if d.npages != base + d.sp {
        return Err(corrupt(format!(
            "npages {} != 2^depth + sp = {}",
            d.npages,
            base + d.sp
        )));
    }
    if splitting_raw > 1 {
        return Err(corrupt(format!("bad splitting flag {}", splitting_raw)));
    }
    if d.splitting {
        return Err(corrupt("relation was closed mid-split".into()));
    }
    if d.insertion > d.capacity {
        return Err(corrupt(format!(
            "insertion counter {} exceeds capacity {}",
            d.insertion, d.capacity
        )));
    }
    for (i, it) in d.chvec.items().iter().enumerate() {
        if it.att >= d.nattrs || it.bit >= 32 {
            return Err(corrupt(format!(
                "choice-vector item {} ({}:{}) out of range",
                i, it.att, it.bit
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::OpenOptions;
    use std::path::PathBuf;

    fn unique_path(prefix: &str) -> PathBuf {
        let pid = std::process::id();
        let t = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("mahdb-{}-{}-{}", prefix, pid, t))
    }

    fn sample_desc() -> Descriptor {
        Descriptor {
            nattrs: 3,
            depth: 2,
            sp: 1,
            npages: 5,
            ntups: 123,
            capacity: Descriptor::capacity_for(3),
            insertion: 7,
            splitting: false,
            chvec: ChoiceVec::parse("0:0,1:0,2:0,0:1", 3).unwrap(),
        }
    }

    #[test]
    fn descriptor_roundtrip() {
        let path = unique_path("meta");
        let f = OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();

        let d0 = sample_desc();
        write_desc(&f, &d0).unwrap();

        let d1 = read_desc(&f).unwrap();
        assert_eq!(d1.nattrs, 3);
        assert_eq!(d1.depth, 2);
        assert_eq!(d1.sp, 1);
        assert_eq!(d1.npages, 5);
        assert_eq!(d1.ntups, 123);
        assert_eq!(d1.capacity, Descriptor::capacity_for(3));
        assert_eq!(d1.insertion, 7);
        assert!(!d1.splitting);
        assert_eq!(d1.chvec, d0.chvec);

        // перезапись поверх
        let mut d2 = d1.clone();
        d2.ntups = 124;
        d2.insertion = 8;
        write_desc(&f, &d2).unwrap();
        let d3 = read_desc(&f).unwrap();
        assert_eq!(d3.ntups, 124);
        assert_eq!(d3.insertion, 8);

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn truncated_info_is_corruption() {
        let path = unique_path("meta-trunc");
        let f = OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        write_desc(&f, &sample_desc()).unwrap();
        f.set_len(100).unwrap();

        let err = read_desc(&f).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Corruption(_))
        ));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn crc_mismatch_is_corruption() {
        use std::io::{Seek, SeekFrom, Write};
        let path = unique_path("meta-crc");
        let f = OpenOptions::new()
            .create_new(true)
            .read(true)
            .write(true)
            .open(&path)
            .unwrap();
        write_desc(&f, &sample_desc()).unwrap();

        // испортим один байт тела, CRC оставим прежним
        let mut w = &f;
        w.seek(SeekFrom::Start(16)).unwrap();
        w.write_all(&[0xFF]).unwrap();

        let err = read_desc(&f).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Corruption(_))
        ));
        std::fs::remove_file(&path).unwrap();
    }
}
