//! rel/insert — вставка кортежа.
//!
//! Публичный insert() проверяет триггер сплита ДО размещения нового
//! кортежа и ведёт счётчики; размещение как таковое живёт в
//! insert_tuple_nocount(), которым пользуется и сплит — повторные вставки
//! при расщеплении счётчиков не трогают.

use crate::consts::{PageId, NO_PAGE, PAGE_DATA_SIZE};
use crate::error::StoreError;
use crate::metrics::record_ovflow_page_alloc;
use crate::page::Page;
use crate::tuple::Tuple;
use anyhow::Result;

use super::core::Relation;

impl Relation {
    /// Вставить кортеж; вернуть id ведра, в которое он лёг.
    pub fn insert(&mut self, raw: &str) -> Result<PageId> {
        let t = Tuple::parse(self.desc.nattrs, raw)?;

        if self.desc.insertion == self.desc.capacity {
            self.desc.splitting = true;
            let res = self.split();
            self.desc.splitting = false;
            res?;
            self.desc.insertion = 0;
        }

        let p = self.insert_tuple_nocount(&t)?;
        self.desc.ntups += 1;
        self.desc.insertion += 1;
        Ok(p)
    }

    /// Разместить кортеж без обновления счётчиков: первичная страница,
    /// затем цепочка переполнения, затем свежая страница в хвост цепочки.
    pub(crate) fn insert_tuple_nocount(&mut self, t: &Tuple) -> Result<PageId> {
        let h = self.tuple_hash(t);
        let p = self.bucket_addr(h);

        let mut page = self.data.read_page(p)?;
        if page.add_tuple(t.raw()) {
            self.data.write_page(p, &page)?;
            return Ok(p);
        }

        // Первичная заполнена — идём по цепочке; запоминаем хвост, чтобы
        // при необходимости подцепить к нему новую страницу.
        let mut cur = page.ovflow();
        let mut tail_page = page;
        let mut tail_id: Option<PageId> = None; // None => хвост — первичная p
        while cur != NO_PAGE {
            let mut ov = self.ovflow.read_page(cur)?;
            if ov.add_tuple(t.raw()) {
                self.ovflow.write_page(cur, &ov)?;
                return Ok(p);
            }
            let next = ov.ovflow();
            tail_page = ov;
            tail_id = Some(cur);
            cur = next;
        }

        // Нигде не поместился — новая страница переполнения.
        let mut fresh = Page::new();
        if !fresh.add_tuple(t.raw()) {
            return Err(StoreError::NoSpace {
                need: t.serialized_len(),
                avail: PAGE_DATA_SIZE,
            }
            .into());
        }
        let new_id = self.ovflow.append_page(&fresh)?;
        record_ovflow_page_alloc();
        tail_page.set_ovflow(new_id);
        match tail_id {
            None => self.data.write_page(p, &tail_page)?,
            Some(id) => self.ovflow.write_page(id, &tail_page)?,
        }
        Ok(p)
    }
}
