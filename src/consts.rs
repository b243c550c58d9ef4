// Страницы
pub const PAGE_SIZE: usize = 1024;
pub const PAGE_HDR_SIZE: usize = 12; // [ntuples u32][free u32][ovflow u32]
pub const PAGE_DATA_SIZE: usize = PAGE_SIZE - PAGE_HDR_SIZE;

// Смещения полей заголовка страницы (LE)
pub const OFF_NTUPLES: usize = 0;
pub const OFF_FREE: usize = 4;
pub const OFF_OVFLOW: usize = 8;

/// Идентификатор страницы внутри одного файла (data или ovflow).
pub type PageId = u32;

/// «Нет страницы» — все единицы в типе page-id.
pub const NO_PAGE: PageId = PageId::MAX;

// Файловое семейство отношения: <rel>.info / <rel>.data / <rel>.ovflow
pub const INFO_EXT: &str = "info";
pub const DATA_EXT: &str = "data";
pub const OVFLOW_EXT: &str = "ovflow";

// Choice vector
pub const MAXCHVEC: usize = 32;

// Дескриптор в .info: 8 счётчиков u32 + MAXCHVEC пар (att u32, bit u32);
// CRC32-хвост пишется следом и в эти байты не входит.
pub const DESC_BYTES: usize = 8 * 4 + MAXCHVEC * 8;
