//! Choice vector: какие биты каких атрибутных хешей образуют составной
//! MAH-хеш кортежа.
//!
//! Текстовый синтаксис: "att:bit,att:bit,..." (например "0:0,1:0,0:1,2:0").
//! Недостающие до MAXCHVEC элементы дополняются нулями (0:0).

use crate::bits::{bit_is_set, set_bit};
use crate::consts::MAXCHVEC;
use crate::error::StoreError;
use anyhow::Result;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{Read, Write};

/// Один элемент: бит `bit` хеша атрибута `att`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChoiceItem {
    pub att: u32,
    pub bit: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceVec {
    items: [ChoiceItem; MAXCHVEC],
}

impl ChoiceVec {
    /// Разобрать текстовую форму. Ошибки разбора — это ошибки создания
    /// отношения, поэтому валидация здесь полная: формат att:bit,
    /// att < nattrs, bit < 32, не больше MAXCHVEC элементов.
    pub fn parse(s: &str, nattrs: u32) -> Result<Self> {
        let mut items = [ChoiceItem::default(); MAXCHVEC];
        let mut n = 0usize;
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                return Err(
                    StoreError::Parse(format!("empty choice-vector item in '{}'", s)).into(),
                );
            }
            if n >= MAXCHVEC {
                return Err(StoreError::Parse(format!(
                    "choice vector has more than {} items",
                    MAXCHVEC
                ))
                .into());
            }
            let (a, b) = match part.split_once(':') {
                Some(pair) => pair,
                None => {
                    return Err(StoreError::Parse(format!(
                        "choice-vector item '{}' is not of the form att:bit",
                        part
                    ))
                    .into())
                }
            };
            let att: u32 = match a.trim().parse() {
                Ok(v) => v,
                Err(_) => {
                    return Err(
                        StoreError::Parse(format!("bad attribute index '{}'", a)).into()
                    )
                }
            };
            let bit: u32 = match b.trim().parse() {
                Ok(v) => v,
                Err(_) => {
                    return Err(StoreError::Parse(format!("bad bit index '{}'", b)).into())
                }
            };
            if att >= nattrs {
                return Err(StoreError::Parse(format!(
                    "attribute index {} out of range 0..{}",
                    att, nattrs
                ))
                .into());
            }
            if bit >= 32 {
                return Err(
                    StoreError::Parse(format!("bit index {} out of range 0..32", bit)).into(),
                );
            }
            items[n] = ChoiceItem { att, bit };
            n += 1;
        }
        Ok(Self { items })
    }

    /// Составной хеш: бит i результата = бит items[i].bit хеша атрибута
    /// items[i].att. attr_hashes должен покрывать все атрибуты схемы.
    pub fn compose(&self, attr_hashes: &[u32]) -> u32 {
        let mut h = 0u32;
        for (i, it) in self.items.iter().enumerate() {
            if bit_is_set(attr_hashes[it.att as usize], it.bit) {
                h = set_bit(h, i as u32);
            }
        }
        h
    }

    #[inline]
    pub fn item(&self, i: usize) -> ChoiceItem {
        self.items[i]
    }

    #[inline]
    pub fn items(&self) -> &[ChoiceItem] {
        &self.items
    }

    pub fn encode<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        for it in &self.items {
            w.write_u32::<LittleEndian>(it.att)?;
            w.write_u32::<LittleEndian>(it.bit)?;
        }
        Ok(())
    }

    pub fn decode<R: Read>(r: &mut R) -> std::io::Result<Self> {
        let mut items = [ChoiceItem::default(); MAXCHVEC];
        for it in items.iter_mut() {
            it.att = r.read_u32::<LittleEndian>()?;
            it.bit = r.read_u32::<LittleEndian>()?;
        }
        Ok(Self { items })
    }
}

impl fmt::Display for ChoiceVec {
    /// Печатает в том же синтаксисе att:bit,... без хвостовых нулевых
    /// элементов (но минимум один).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let last = self
            .items
            .iter()
            .rposition(|it| *it != ChoiceItem::default())
            .unwrap_or(0);
        for (i, it) in self.items[..=last].iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}:{}", it.att, it.bit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    #[test]
    fn parse_and_display() {
        let cv = ChoiceVec::parse("0:0,1:0,0:1,2:0", 3).unwrap();
        assert_eq!(cv.item(0), ChoiceItem { att: 0, bit: 0 });
        assert_eq!(cv.item(1), ChoiceItem { att: 1, bit: 0 });
        assert_eq!(cv.item(2), ChoiceItem { att: 0, bit: 1 });
        assert_eq!(cv.item(3), ChoiceItem { att: 2, bit: 0 });
        // хвост дополнен нулями
        assert_eq!(cv.item(4), ChoiceItem::default());
        assert_eq!(cv.item(MAXCHVEC - 1), ChoiceItem::default());
        assert_eq!(format!("{}", cv), "0:0,1:0,0:1,2:0");
    }

    #[test]
    fn parse_rejects_garbage() {
        for bad in ["", "0", "0:x", "x:0", "3:0", "0:32", "0:0,,1:0"] {
            let err = ChoiceVec::parse(bad, 3).unwrap_err();
            assert!(
                matches!(err.downcast_ref::<StoreError>(), Some(StoreError::Parse(_))),
                "'{}' must be a parse error, got {:#}",
                bad,
                err
            );
        }
    }

    #[test]
    fn compose_picks_named_bits() {
        let cv = ChoiceVec::parse("0:0,1:3,0:1", 2).unwrap();
        // att0 = ...10 (bit0=0, bit1=1), att1 bit3 = 1
        let h = cv.compose(&[0b10, 0b1000]);
        // бит0 <- att0.bit0 = 0; бит1 <- att1.bit3 = 1; бит2 <- att0.bit1 = 1
        assert_eq!(h & 0b111, 0b110);
    }

    #[test]
    fn encode_decode_roundtrip() {
        let cv = ChoiceVec::parse("1:7,0:31", 2).unwrap();
        let mut buf = Vec::new();
        cv.encode(&mut buf).unwrap();
        assert_eq!(buf.len(), MAXCHVEC * 8);
        let back = ChoiceVec::decode(&mut buf.as_slice()).unwrap();
        assert_eq!(back, cv);
    }
}
