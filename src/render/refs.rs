use pdf_writer::Ref;
use std::collections::HashMap;

use super::canvas::Font;

#[derive(Eq, PartialEq, Hash, Copy, Clone, Debug)]
pub enum RefType {
    Catalog,
    Info,
    PageTree,
    Page(usize),
    ContentForPage(usize),
    Font(Font),
    Logo,
    LogoMask,
}

/// Hands out object ids, remembering which object each one was made for
pub struct ObjectReferences {
    refs: HashMap<RefType, Ref>,
    next_id: i32,
}

impl ObjectReferences {
    pub fn new() -> ObjectReferences {
        ObjectReferences {
            refs: HashMap::new(),
            next_id: 1,
        }
    }

    /// The id generated for `ref_type`, creating it on first use
    pub fn get(&mut self, ref_type: RefType) -> Ref {
        let next_id = &mut self.next_id;
        *self.refs.entry(ref_type).or_insert_with(|| {
            let id = Ref::new(*next_id);
            *next_id += 1;
            id
        })
    }
}
