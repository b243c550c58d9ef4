//! Кортежи: разбор текстовой формы "v1,v2,...,vN", сериализация с
//! NUL-терминатором, пер-атрибутные хеши.
//!
//! Значения атрибутов — непустые строки без запятых и NUL; арность
//! фиксируется при создании отношения.

use crate::error::StoreError;
use crate::hash::{hash32, HashKind};
use anyhow::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuple {
    raw: String,
    fields: Vec<String>,
}

impl Tuple {
    /// Разобрать и проверить кортеж: ровно nattrs полей, все непустые,
    /// без NUL.
    pub fn parse(nattrs: u32, s: &str) -> Result<Self> {
        if s.contains('\0') {
            return Err(StoreError::Parse("tuple contains a NUL byte".into()).into());
        }
        let fields: Vec<String> = s.split(',').map(str::to_string).collect();
        if fields.len() != nattrs as usize {
            return Err(StoreError::Parse(format!(
                "tuple '{}' has {} attributes, schema has {}",
                s,
                fields.len(),
                nattrs
            ))
            .into());
        }
        if fields.iter().any(|f| f.is_empty()) {
            return Err(
                StoreError::Parse(format!("tuple '{}' has an empty attribute", s)).into(),
            );
        }
        Ok(Self {
            raw: s.to_string(),
            fields,
        })
    }

    /// Текстовая форма без терминатора.
    #[inline]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[inline]
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Длина сериализованной формы "v1,...,vN\0".
    #[inline]
    pub fn serialized_len(&self) -> usize {
        self.raw.len() + 1
    }

    /// 32-битный хеш каждого атрибута по порядку.
    pub fn hashes(&self, kind: HashKind) -> Vec<u32> {
        self.fields
            .iter()
            .map(|f| hash32(kind, f.as_bytes()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::hash::HASH_KIND_DEFAULT;

    #[test]
    fn parse_ok() {
        let t = Tuple::parse(3, "a,bb,ccc").unwrap();
        assert_eq!(t.fields(), &["a", "bb", "ccc"]);
        assert_eq!(t.raw(), "a,bb,ccc");
        assert_eq!(t.serialized_len(), 9);
        assert_eq!(t.hashes(HASH_KIND_DEFAULT).len(), 3);
    }

    #[test]
    fn parse_rejects_bad_arity_and_empty_fields() {
        for bad in ["a,b", "a,b,c,d", "a,,c", ",b,c", "a,b,"] {
            let err = Tuple::parse(3, bad).unwrap_err();
            assert!(
                matches!(err.downcast_ref::<StoreError>(), Some(StoreError::Parse(_))),
                "'{}' must fail to parse",
                bad
            );
        }
    }

    #[test]
    fn parse_rejects_nul() {
        assert!(Tuple::parse(2, "a,b\0c").is_err());
    }
}
