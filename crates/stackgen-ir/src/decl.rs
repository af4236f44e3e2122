use crate::body::Body;
use crate::error::Result;
use crate::span::Span;
use crate::ty::{FnTy, Ty};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stable identity of a declaration in the [`DeclTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(pub u32);

impl DeclId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl Display for DeclId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "decl{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decl {
    pub name: String,
    pub ty: Ty,
    #[serde(default)]
    pub span: Span,
    /// `None` for extern declarations that are only ever called.
    #[serde(default)]
    pub body: Option<Body>,
}

impl Decl {
    pub fn function(name: impl Into<String>, ty: FnTy, body: Body) -> Self {
        Self {
            name: name.into(),
            ty: Ty::Fn(Box::new(ty)),
            span: Span::dummy(),
            body: Some(body),
        }
    }

    pub fn extern_fn(name: impl Into<String>, ty: FnTy) -> Self {
        Self {
            name: name.into(),
            ty: Ty::Fn(Box::new(ty)),
            span: Span::dummy(),
            body: None,
        }
    }

    pub fn fn_ty(&self) -> Option<&FnTy> {
        self.ty.fn_ty()
    }
}

/// Pending patch: the function index of `target` must be written at `offset`
/// within the owning function's body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Reloc {
    pub offset: u32,
    pub target: DeclId,
}

/// Per-declaration data consumed by the link stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkData {
    pub relocs: Vec<Reloc>,
}

/// All declarations of a module. Link data is stored beside the declarations
/// so a generator can read one declaration while its link list is updated.
#[derive(Debug, Clone, Default)]
pub struct DeclTable {
    decls: Vec<Decl>,
    links: Vec<LinkData>,
}

impl DeclTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, decl: Decl) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        self.links.push(LinkData::default());
        id
    }

    pub fn get(&self, id: DeclId) -> Option<&Decl> {
        self.decls.get(id.index())
    }

    /// Panics when `id` was not issued by this table.
    pub fn decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    pub fn link(&self, id: DeclId) -> &LinkData {
        &self.links[id.index()]
    }

    pub fn link_mut(&mut self, id: DeclId) -> &mut LinkData {
        &mut self.links[id.index()]
    }

    pub fn find(&self, name: &str) -> Option<DeclId> {
        self.decls
            .iter()
            .position(|decl| decl.name == name)
            .map(|idx| DeclId(idx as u32))
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Decl)> + '_ {
        self.decls
            .iter()
            .enumerate()
            .map(|(idx, decl)| (DeclId(idx as u32), decl))
    }

    pub fn ids(&self) -> impl Iterator<Item = DeclId> {
        (0..self.decls.len() as u32).map(DeclId)
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }
}

/// Serialized form of a module: declarations in table order, so a
/// `ConstValue::Function(DeclId(n))` names the n-th entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IrModule {
    pub decls: Vec<Decl>,
}

impl IrModule {
    pub fn from_json(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn into_table(self) -> DeclTable {
        let mut table = DeclTable::new();
        for decl in self.decls {
            table.add(decl);
        }
        table
    }
}
