//! The shared matcap material.

use std::{cell::RefCell, rc::Rc};

/// Index of a matcap texture in the loaded matcap set. Displayed one based.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatcapId(usize);

impl MatcapId {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// The id of the `number`-th matcap, counting from one. `None` for zero.
    pub fn from_number(number: usize) -> Option<Self> {
        number.checked_sub(1).map(Self)
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn label(self) -> String {
        (self.0 + 1).to_string()
    }
}

/// A material that shades purely from a matcap texture.
#[derive(Debug, PartialEq)]
pub struct MatcapMaterial {
    matcap: MatcapId,
}

/// One material instance referenced by many meshes.
pub type SharedMaterial = Rc<RefCell<MatcapMaterial>>;

impl MatcapMaterial {
    pub fn new(matcap: MatcapId) -> Self {
        Self { matcap }
    }

    pub fn shared(self) -> SharedMaterial {
        Rc::new(RefCell::new(self))
    }

    pub fn matcap(&self) -> MatcapId {
        self.matcap
    }

    pub fn set_matcap(&mut self, matcap: MatcapId) {
        self.matcap = matcap;
    }
}
