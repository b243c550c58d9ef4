//! rel/split — расщепление ведра sp: адресное пространство растёт на одно
//! ведро, источник перекладывается по depth+1 битам.
//!
//! Источник потребляется страница за страницей: снимок кортежей, очистка
//! страницы на месте с сохранением её ссылки на цепочку, повторная
//! вставка через insert_tuple_nocount. Повторная вставка может лечь на
//! ещё не потреблённую страницу цепочки — такой кортеж будет снят и
//! переложен заново, когда очередь дойдёт до неё, поэтому ничего не
//! теряется и не дублируется. Логически освободившиеся страницы
//! переполнения не возвращаются — ovflow-файл растёт монотонно.

use crate::consts::NO_PAGE;
use crate::metrics::{record_split, record_split_tuple_moved};
use crate::page::Page;
use crate::tuple::Tuple;
use anyhow::Result;
use log::debug;

use super::core::Relation;

impl Relation {
    pub(crate) fn split(&mut self) -> Result<()> {
        // Отложенный перенос указателя: sp дошёл до 2^depth, адресное
        // пространство уже удвоено — поднимаем глубину и возвращаем sp
        // в начало, ведро в этот раз не расщепляется.
        if self.desc.sp == (1u32 << self.desc.depth) {
            self.desc.depth += 1;
            self.desc.sp = 0;
            debug!(
                "depth rollover: depth={} sp=0 npages={}",
                self.desc.depth, self.desc.npages
            );
            return Ok(());
        }

        let src = self.desc.sp;
        let buddy = self.data.append_page(&Page::new())?;
        self.desc.npages += 1;
        debug_assert_eq!(buddy, src + (1u32 << self.desc.depth));

        debug!(
            "split bucket {} -> buddy {} (depth={}, sp={})",
            src, buddy, self.desc.depth, self.desc.sp
        );
        record_split();

        // Первичная страница источника: снимок, очистка с сохранением
        // ссылки на прежнюю цепочку.
        let mut prim = self.data.read_page(src)?;
        let tuples = prim.tuples()?;
        let first_link = prim.ovflow();
        prim.clear_keep_link();
        self.data.write_page(src, &prim)?;

        // sp двигается ДО повторных вставок: адресация p < sp раскладывает
        // кортежи источника по depth+1 битам — в src либо в buddy.
        self.desc.sp += 1;

        for raw in &tuples {
            let t = Tuple::parse(self.desc.nattrs, raw)?;
            self.insert_tuple_nocount(&t)?;
            record_split_tuple_moved();
        }

        // Цепочка источника, в порядке обхода.
        let mut cur = first_link;
        while cur != NO_PAGE {
            let mut ov = self.ovflow.read_page(cur)?;
            let tuples = ov.tuples()?;
            let next = ov.ovflow();
            ov.clear_keep_link();
            self.ovflow.write_page(cur, &ov)?;
            for raw in &tuples {
                let t = Tuple::parse(self.desc.nattrs, raw)?;
                self.insert_tuple_nocount(&t)?;
                record_split_tuple_moved();
            }
            cur = next;
        }

        Ok(())
    }
}
