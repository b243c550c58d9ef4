//! query — частичное сопоставление с джокерами: компиляция шаблона,
//! перечисление вёдер-кандидатов, потоковая выдача кортежей.
//!
//! Шаблон той же арности, что схема; '?' — неизвестный атрибут. Известные
//! атрибуты дают фиксированные биты составного хеша, джокеры — «звёздные»
//! позиции, по которым пробегает счётчик bit_seq: каждому его значению
//! отвечает одно ведро-кандидат. Нижняя граница работы — одна выборка
//! страницы на кандидата; кандидаты из ещё не существующей старшей
//! половины адресного пространства пропускаются без чтения.
//!
//! Query заимствует Relation на всё время жизни: пока открыт хотя бы один
//! запрос, мутировать отношение не даст компилятор.

use crate::bits::{bit_is_set, lower_bits, set_bit};
use crate::consts::{PageId, NO_PAGE};
use crate::error::StoreError;
use crate::hash::hash32;
use crate::rel::Relation;
use anyhow::Result;

pub struct Query<'r> {
    rel: &'r Relation,
    /// None — джокер.
    pattern: Vec<Option<String>>,
    /// Фиксированные биты составного хеша (от известных атрибутов).
    known: u32,
    /// Позиции составного хеша, чей атрибут-источник неизвестен,
    /// по возрастанию.
    star_bits: Vec<u32>,
    bit_seq: u64,
    bit_seq_max: u64,
    cur: Option<Scan>,
    exhausted: bool,
}

/// Позиция чтения внутри текущей цепочки.
struct Scan {
    tuples: Vec<String>,
    idx: usize,
    /// Следующая страница цепочки либо NO_PAGE.
    next: PageId,
}

impl<'r> Query<'r> {
    /// Скомпилировать шаблон для отношения.
    pub fn new(rel: &'r Relation, pattern: &str) -> Result<Self> {
        let nattrs = rel.desc.nattrs as usize;
        if pattern.contains('\0') {
            return Err(StoreError::Parse("pattern contains a NUL byte".into()).into());
        }
        let parts: Vec<&str> = pattern.split(',').collect();
        if parts.len() != nattrs {
            return Err(StoreError::Parse(format!(
                "pattern '{}' has {} attributes, schema has {}",
                pattern,
                parts.len(),
                nattrs
            ))
            .into());
        }
        let mut fields: Vec<Option<String>> = Vec::with_capacity(nattrs);
        for p in &parts {
            if *p == "?" {
                fields.push(None);
            } else if p.is_empty() {
                return Err(StoreError::Parse(format!(
                    "pattern '{}' has an empty attribute",
                    pattern
                ))
                .into());
            } else {
                fields.push(Some((*p).to_string()));
            }
        }

        // Хеши известных атрибутов.
        let mut attr_hashes = vec![0u32; nattrs];
        for (i, f) in fields.iter().enumerate() {
            if let Some(v) = f {
                attr_hashes[i] = hash32(rel.hash_kind, v.as_bytes());
            }
        }

        // Обход cv[0..=depth] — биты, определяющие адресацию при
        // глубине depth+1: известный источник даёт бит known,
        // неизвестный — звёздную позицию.
        let depth = rel.desc.depth;
        let mut known = 0u32;
        let mut star_bits = Vec::new();
        for i in 0..=depth {
            let it = rel.desc.chvec.item(i as usize);
            match &fields[it.att as usize] {
                Some(_) => {
                    if bit_is_set(attr_hashes[it.att as usize], it.bit) {
                        known = set_bit(known, i);
                    }
                }
                None => star_bits.push(i),
            }
        }
        let bit_seq_max = (1u64 << star_bits.len()) - 1;

        Ok(Self {
            rel,
            pattern: fields,
            known,
            star_bits,
            bit_seq: 0,
            bit_seq_max,
            cur: None,
            exhausted: false,
        })
    }

    /// Разбросать биты счётчика по звёздным позициям.
    fn scatter(&self, seq: u64) -> u32 {
        let mut unknown = 0u32;
        for (j, &pos) in self.star_bits.iter().enumerate() {
            if (seq >> j) & 1 == 1 {
                unknown = set_bit(unknown, pos);
            }
        }
        unknown
    }

    /// Ведро-кандидат для данного bit_seq; None — кандидат лежит в ещё
    /// не существующей старшей половине и пропускается без чтения.
    fn candidate(&self, seq: u64) -> Option<PageId> {
        let d = self.rel.desc.depth;
        let h = self.known | self.scatter(seq);
        if self.star_bits.last() == Some(&d) {
            // depth+1-й бит сам неизвестен: адресуемся depth+1 битами
            // безусловно — иначе, перебирая 1XX, мы заново посещали бы
            // вёдра 0XX.
            let p = lower_bits(h, d + 1);
            if p >= self.rel.desc.npages {
                return None;
            }
            Some(p)
        } else {
            let mut p = lower_bits(h, d);
            if p < self.rel.desc.sp {
                p = lower_bits(h, d + 1);
            }
            Some(p)
        }
    }

    fn load_primary(&mut self, p: PageId) -> Result<()> {
        let page = self.rel.read_primary(p)?;
        self.cur = Some(Scan {
            tuples: page.tuples()?,
            idx: 0,
            next: page.ovflow(),
        });
        Ok(())
    }

    fn load_ovflow(&mut self, id: PageId) -> Result<()> {
        let page = self.rel.read_ovflow(id)?;
        self.cur = Some(Scan {
            tuples: page.tuples()?,
            idx: 0,
            next: page.ovflow(),
        });
        Ok(())
    }

    /// Следующий совпавший кортеж либо None, когда последняя страница
    /// последнего кандидата дочитана. Позиция сохраняется между вызовами.
    pub fn next_match(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(scan) = self.cur.as_mut() {
                while scan.idx < scan.tuples.len() {
                    let i = scan.idx;
                    scan.idx += 1;
                    if tuple_matches(&self.pattern, &scan.tuples[i]) {
                        return Ok(Some(scan.tuples[i].clone()));
                    }
                }
                // Страница дочитана: дальше по цепочке либо к следующему
                // bit_seq.
                let next = scan.next;
                self.cur = None;
                if next != NO_PAGE {
                    self.load_ovflow(next)?;
                    continue;
                }
                self.bit_seq += 1;
            }

            if self.exhausted {
                return Ok(None);
            }
            loop {
                if self.bit_seq > self.bit_seq_max {
                    self.exhausted = true;
                    return Ok(None);
                }
                match self.candidate(self.bit_seq) {
                    Some(p) => {
                        self.load_primary(p)?;
                        break;
                    }
                    None => self.bit_seq += 1,
                }
            }
        }
    }
}

impl<'r> Iterator for Query<'r> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_match().transpose()
    }
}

/// Совпадение: каждое не-джокерное поле шаблона побайтно равно
/// соответствующему полю кортежа.
fn tuple_matches(pattern: &[Option<String>], tuple: &str) -> bool {
    let mut fields = tuple.split(',');
    for pat in pattern {
        let f = match fields.next() {
            Some(f) => f,
            None => return false,
        };
        if let Some(p) = pat {
            if f != p.as_str() {
                return false;
            }
        }
    }
    fields.next().is_none()
}
