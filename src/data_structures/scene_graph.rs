//! Scene graph and hierarchical scene organization.
//!
//! The scene is a tree of boxed [`SceneNode`]s below a single root. Each node
//! owns its children and carries a local [`Transform`]; a node's world matrix
//! is its parent's world matrix times its local matrix. Mesh nodes reference a
//! shared geometry and a shared material, so many nodes can display the same
//! shape without copying it.

use std::rc::Rc;

use cgmath::{Matrix4, SquareMatrix};

use crate::{
    data_structures::{instance::Transform, material::SharedMaterial},
    geometry::Geometry,
};

/// The renderable payload of a node.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub geometry: Rc<Geometry>,
    pub material: SharedMaterial,
}

/// A mesh resolved to world space, ready to be batched by the renderer.
#[derive(Clone, Debug)]
pub struct Renderable {
    pub geometry: Rc<Geometry>,
    pub material: SharedMaterial,
    pub world: Matrix4<f32>,
}

pub trait SceneNode {
    fn get_local_transform(&self) -> &Transform;

    fn mesh(&self) -> Option<&Mesh>;

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>>;

    fn add_child(&mut self, child: Box<dyn SceneNode>);
}

/// A node without a mesh. Only groups and transforms its children.
pub struct ContainerNode {
    pub children: Vec<Box<dyn SceneNode>>,
    transform: Transform,
}

impl ContainerNode {
    pub fn new(transform: Transform) -> Self {
        Self {
            children: vec![],
            transform,
        }
    }
}

impl Default for ContainerNode {
    fn default() -> Self {
        Self::new(Transform::default())
    }
}

impl SceneNode for ContainerNode {
    fn get_local_transform(&self) -> &Transform {
        &self.transform
    }

    fn mesh(&self) -> Option<&Mesh> {
        None
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }
}

pub struct MeshNode {
    pub children: Vec<Box<dyn SceneNode>>,
    transform: Transform,
    mesh: Mesh,
}

impl MeshNode {
    pub fn new(geometry: Rc<Geometry>, material: SharedMaterial, transform: Transform) -> Self {
        Self {
            children: vec![],
            transform,
            mesh: Mesh { geometry, material },
        }
    }
}

impl SceneNode for MeshNode {
    fn get_local_transform(&self) -> &Transform {
        &self.transform
    }

    fn mesh(&self) -> Option<&Mesh> {
        Some(&self.mesh)
    }

    fn get_children(&self) -> &Vec<Box<dyn SceneNode>> {
        &self.children
    }

    fn add_child(&mut self, child: Box<dyn SceneNode>) {
        self.children.push(child);
    }
}

/// Owner of the single scene root.
pub struct SceneGraph {
    root: Box<dyn SceneNode>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            root: Box::new(ContainerNode::default()),
        }
    }

    pub fn root(&self) -> &dyn SceneNode {
        self.root.as_ref()
    }

    pub fn add(&mut self, node: Box<dyn SceneNode>) {
        self.root.add_child(node);
    }

    /// Every mesh in the tree with its world matrix, in depth first order.
    pub fn renderables(&self) -> Vec<Renderable> {
        let mut out = Vec::new();
        collect_renderables(self.root(), &Matrix4::identity(), &mut out);
        out
    }

    /// Number of nodes below the root that carry a mesh.
    pub fn renderable_count(&self) -> usize {
        count_meshes(self.root()) - usize::from(self.root().mesh().is_some())
    }
}

fn collect_renderables(node: &dyn SceneNode, parent: &Matrix4<f32>, out: &mut Vec<Renderable>) {
    let world = parent * node.get_local_transform().to_matrix();
    if let Some(mesh) = node.mesh() {
        out.push(Renderable {
            geometry: Rc::clone(&mesh.geometry),
            material: Rc::clone(&mesh.material),
            world,
        });
    }
    for child in node.get_children() {
        collect_renderables(child.as_ref(), &world, out);
    }
}

fn count_meshes(node: &dyn SceneNode) -> usize {
    usize::from(node.mesh().is_some())
        + node
            .get_children()
            .iter()
            .map(|child| count_meshes(child.as_ref()))
            .sum::<usize>()
}
