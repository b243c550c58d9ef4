//! Типизированные ошибки хранилища.
//!
//! Весь код возвращает anyhow::Result; виды ошибок, которые имеет смысл
//! различать на границе CLI и в тестах, оформлены как StoreError и
//! поднимаются через anyhow (downcast_ref на приёмной стороне).
//! Ошибки ввода-вывода остаются std::io::Error с контекстом.

use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    /// Малформенный кортеж, шаблон запроса или choice vector.
    Parse(String),
    /// Сериализованный кортеж больше полезной области страницы —
    /// разместить его нельзя нигде.
    NoSpace { need: usize, avail: usize },
    /// Операция над отношением, которого не существует.
    NotFound(String),
    /// Инфо-файл короче ожидаемого либо страница не согласована
    /// со своим заголовком.
    Corruption(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Parse(msg) => write!(f, "parse error: {}", msg),
            StoreError::NoSpace { need, avail } => write!(
                f,
                "tuple of {} bytes exceeds page data area of {} bytes",
                need, avail
            ),
            StoreError::NotFound(name) => write!(f, "relation {} does not exist", name),
            StoreError::Corruption(msg) => write!(f, "corruption: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}
